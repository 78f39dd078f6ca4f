//! Gateway-injected admin identity extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

pub const X_CODEGATE_ADMIN_ID: &str = "x-codegate-admin-id";

/// Admin identity injected by the console gateway via `x-codegate-admin-id`.
///
/// The console authenticates admins with its own session cookies; by the time a request
/// reaches this service the gateway has replaced the cookie with this header.
/// Returns 401 if the header is absent or empty.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub admin_id: String,
}

impl<S> FromRequestParts<S> for AdminIdentity
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // Extract synchronously and return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let admin_id = parts
            .headers
            .get(X_CODEGATE_ADMIN_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        async move {
            let admin_id = admin_id.ok_or(StatusCode::UNAUTHORIZED)?;
            Ok(Self { admin_id })
        }
    }
}
