//! Signed-request header parsing.

use axum::extract::FromRequestParts;
use http::request::Parts;
use http::{HeaderMap, StatusCode};

pub const X_API_KEY: &str = "x-api-key";
pub const X_TIMESTAMP: &str = "x-timestamp";
pub const X_SIGNATURE: &str = "x-signature";

/// The three authentication headers an SDK client sends with every request.
///
/// Parsing never distinguishes which header was missing or malformed: any failure is a
/// bare 401 that does not reveal which header was at fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub api_key: String,
    /// Unix seconds.
    pub timestamp: i64,
    pub signature: String,
}

impl SignedHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let get = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        let api_key = get(X_API_KEY).filter(|v| !v.is_empty())?;
        let timestamp = get(X_TIMESTAMP)?.trim().parse::<i64>().ok()?;
        let signature = get(X_SIGNATURE).filter(|v| !v.is_empty())?;
        Some(Self {
            api_key: api_key.to_owned(),
            timestamp,
            signature: signature.to_owned(),
        })
    }
}

impl<S> FromRequestParts<S> for SignedHeaders
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let headers = Self::from_headers(&parts.headers);
        async move { headers.ok_or(StatusCode::UNAUTHORIZED) }
    }
}
