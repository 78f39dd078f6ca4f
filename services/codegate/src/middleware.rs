use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Instant;

use axum::body::{Body, to_bytes};
use axum::extract::{ConnectInfo, FromRequestParts, OriginalUri, Request, State};
use axum::http::Extensions;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use tracing::{debug, warn};

use codegate_auth_types::headers::SignedHeaders;

use crate::domain::repository::ApiKeyRepository;
use crate::domain::types::{ApiKey, ClientInfo};
use crate::error::CodegateError;
use crate::state::AppState;
use crate::usecase::signature::{AuthenticateRequestUseCase, SignedRequest};

/// The key that signed the current request. Inserted by [`require_signature`].
#[derive(Debug, Clone)]
pub struct AuthenticatedKey(pub ApiKey);

/// Authenticate an SDK request by its HMAC signature.
///
/// The body is buffered (up to `max_body_bytes`) so the signature covers the exact bytes
/// received; the handler then gets those same bytes back.
pub async fn require_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, CodegateError> {
    let Some(headers) = SignedHeaders::from_headers(request.headers()) else {
        debug!("missing or malformed signature headers");
        return Err(CodegateError::Unauthorized);
    };

    let (mut parts, body) = request.into_parts();
    let bytes = to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|_| CodegateError::validation("request body too large"))?;

    // Routers may be nested; the client signed the full path.
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| parts.uri.clone());

    let now = Utc::now();
    let usecase = AuthenticateRequestUseCase {
        keys: state.api_key_repo(),
        window_secs: state.signature_window_secs,
    };
    let key = usecase
        .execute(
            SignedRequest {
                method: parts.method.as_str(),
                path: uri.path(),
                raw_query: uri.query(),
                body: &bytes,
                headers: &headers,
            },
            now.timestamp(),
        )
        .await?;

    let keys = state.api_key_repo();
    let key_id = key.id;
    tokio::spawn(async move {
        if let Err(e) = keys.touch_last_used(key_id, now).await {
            warn!(api_key_id = %key_id, error = ?e, "failed to record api key use");
        }
    });

    parts.extensions.insert(AuthenticatedKey(key));
    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// Peer IP as seen by the listener. Absent when the server runs without connect info.
fn peer_ip(extensions: &Extensions) -> Option<String> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let client = ClientInfo {
            ip_address: peer_ip(&parts.extensions),
            user_agent: parts
                .headers
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
        };
        async move { Ok(client) }
    }
}

/// Per-IP budget on verify attempts. Requests without a known peer address pass.
pub async fn limit_verify_attempts(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, CodegateError> {
    if let Some(ip) = peer_ip(request.extensions()) {
        if !state.verify_limiter.try_acquire(&ip, Instant::now()) {
            warn!(ip_address = %ip, "verify rate limit exceeded");
            return Err(CodegateError::RateLimited);
        }
    }
    Ok(next.run(request).await)
}
