//! Client-side request signing for tests.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use chrono::Utc;

use codegate_auth_types::headers::{X_API_KEY, X_SIGNATURE, X_TIMESTAMP};
use codegate_auth_types::signature::CanonicalRequest;

/// Signs requests the way an SDK client does.
#[derive(Debug, Clone)]
pub struct TestSigner {
    pub api_key: String,
    pub secret: String,
}

impl TestSigner {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    /// Signature for an explicit timestamp. `query` holds decoded pairs in any order.
    pub fn signature_at(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, &str)],
        body: &[u8],
        timestamp: i64,
    ) -> String {
        CanonicalRequest::from_pairs(method, path, query.iter().copied(), body, timestamp)
            .sign(&self.secret)
    }

    /// Authentication headers for a request signed at `timestamp`.
    pub fn headers_at(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, &str)],
        body: &[u8],
        timestamp: i64,
    ) -> HeaderMap {
        let signature = self.signature_at(method, path, query, body, timestamp);
        let mut map = HeaderMap::new();
        map.insert(
            HeaderName::from_static(X_API_KEY),
            HeaderValue::from_str(&self.api_key).unwrap(),
        );
        map.insert(
            HeaderName::from_static(X_TIMESTAMP),
            HeaderValue::from_str(&timestamp.to_string()).unwrap(),
        );
        map.insert(
            HeaderName::from_static(X_SIGNATURE),
            HeaderValue::from_str(&signature).unwrap(),
        );
        map
    }

    /// Authentication headers signed now.
    pub fn headers(&self, method: &str, path: &str, query: &[(&str, &str)], body: &[u8]) -> HeaderMap {
        self.headers_at(method, path, query, body, Utc::now().timestamp())
    }
}
