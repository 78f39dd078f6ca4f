use std::net::SocketAddr;

use axum::Extension;
use axum::extract::ConnectInfo;
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use sea_orm::DatabaseConnection;

use codegate::rate_limit::VerifyRateLimiter;
use codegate::router::build_router;
use codegate::state::AppState;
use codegate_auth_types::headers::X_TIMESTAMP;
use codegate_auth_types::signature::DEFAULT_REPLAY_WINDOW_SECS;
use codegate_core::middleware::X_REQUEST_ID;
use codegate_testing::auth::MockAdmin;
use codegate_testing::signer::TestSigner;

const VERIFY_PATH: &str =
    "/api/v1/sdk/projects/5f0c6f5e-8f0a-4a53-9d35-1c1f3f2f8c11/codes/verify";

const PROJECT_ID: &str = "5f0c6f5e-8f0a-4a53-9d35-1c1f3f2f8c11";

fn state(verify_per_minute: u32) -> AppState {
    AppState {
        db: DatabaseConnection::Disconnected,
        signature_window_secs: DEFAULT_REPLAY_WINDOW_SECS,
        max_body_bytes: 64,
        code_length: 12,
        verify_limiter: VerifyRateLimiter::per_minute(verify_per_minute),
    }
}

/// A server whose database is unreachable: only paths that never touch storage succeed.
fn server() -> TestServer {
    TestServer::new(build_router(state(60), 5)).unwrap()
}

/// Like [`server`], with every request arriving from the same peer address.
fn server_behind_peer(verify_per_minute: u32) -> TestServer {
    let peer = ConnectInfo(SocketAddr::from(([203, 0, 113, 9], 40_000)));
    let router = build_router(state(verify_per_minute), 5).layer(Extension(peer));
    TestServer::new(router).unwrap()
}

fn admin_verify_path() -> String {
    format!("/api/v1/admin/projects/{PROJECT_ID}/codes/verify")
}

async fn admin_verify(server: &TestServer) -> axum_test::TestResponse {
    with_headers(server.post(&admin_verify_path()), MockAdmin::new("admin-1").headers())
        .json(&serde_json::json!({ "code": "ABC" }))
        .await
}

fn with_headers(mut request: TestRequest, headers: HeaderMap) -> TestRequest {
    for (name, value) in &headers {
        request = request.add_header(name.clone(), value.clone());
    }
    request
}

fn signer() -> TestSigner {
    TestSigner::new("0123456789abcdef0123456789abcdef", "secret")
}

#[tokio::test]
async fn should_answer_liveness_with_request_id() {
    let response = server().get("/healthz").await;

    response.assert_status_ok();
    assert!(response.headers().contains_key(X_REQUEST_ID));
}

#[tokio::test]
async fn should_report_not_ready_without_database() {
    let response = server().get("/readyz").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn should_reject_sdk_request_without_signature_headers() {
    let response = server()
        .post(VERIFY_PATH)
        .json(&serde_json::json!({ "code": "ABC" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "UNAUTHORIZED");
    assert_eq!(body["message"], "invalid credentials");
}

#[tokio::test]
async fn should_reject_malformed_timestamp_header() {
    let mut headers = signer().headers("POST", VERIFY_PATH, &[], b"");
    headers.insert(
        HeaderName::from_static(X_TIMESTAMP),
        HeaderValue::from_static("yesterday"),
    );

    let response = with_headers(server().post(VERIFY_PATH), headers).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_oversized_signed_body() {
    let body = vec![b'x'; 128];
    let headers = signer().headers("POST", VERIFY_PATH, &[], &body);

    let response = with_headers(server().post(VERIFY_PATH), headers)
        .bytes(body.into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: serde_json::Value = response.json();
    assert_eq!(json["kind"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn should_reject_admin_request_without_identity() {
    let response = server().get("/api/v1/admin/projects").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_reject_invalid_project_id_before_touching_storage() {
    let response = with_headers(
        server().get("/api/v1/admin/projects/not-a-uuid"),
        MockAdmin::new("admin-1").headers(),
    )
    .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_limit_verify_attempts_per_client_ip() {
    let server = server_behind_peer(2);

    // Within budget the request reaches storage, which is down.
    for _ in 0..2 {
        admin_verify(&server)
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let response = admin_verify(&server).await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[RETRY_AFTER], "60");
    let json: serde_json::Value = response.json();
    assert_eq!(json["kind"], "RATE_LIMITED");
}

#[tokio::test]
async fn should_not_limit_requests_without_peer_address() {
    let server = TestServer::new(build_router(state(1), 5)).unwrap();

    for _ in 0..3 {
        admin_verify(&server)
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[tokio::test]
async fn should_leave_other_admin_routes_unlimited() {
    let server = server_behind_peer(1);
    admin_verify(&server)
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let path = format!("/api/v1/admin/projects/{PROJECT_ID}/codes");
    for _ in 0..2 {
        with_headers(server.get(&path), MockAdmin::new("admin-1").headers())
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[tokio::test]
async fn should_authenticate_sdk_verify_before_charging_the_limit() {
    let server = server_behind_peer(1);

    for _ in 0..3 {
        server
            .post(VERIFY_PATH)
            .json(&serde_json::json!({ "code": "ABC" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn should_accept_admin_reactivation_without_body() {
    let path = format!(
        "/api/v1/admin/projects/{PROJECT_ID}/codes/0b7e1d7c-2f4e-4c2a-9a51-6a0d9f1e3b22/reactivate"
    );

    let response = with_headers(server().post(&path), MockAdmin::new("admin-1").headers()).await;

    // Past body extraction: the request fails only on the unreachable database.
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = response.json();
    assert_eq!(json["kind"], "INTERNAL");
}
