use tracing::debug;

use codegate_auth_types::headers::SignedHeaders;
use codegate_auth_types::signature::{CanonicalRequest, is_fresh};

use crate::domain::repository::ApiKeyRepository;
use crate::domain::types::ApiKey;
use crate::error::CodegateError;

/// What the server actually received, before any parsing of query or body.
pub struct SignedRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub raw_query: Option<&'a str>,
    pub body: &'a [u8],
    pub headers: &'a SignedHeaders,
}

pub struct AuthenticateRequestUseCase<K: ApiKeyRepository> {
    pub keys: K,
    pub window_secs: u64,
}

/// Keys the MAC when the presented api key is unknown, so every rejection costs one
/// lookup and one HMAC.
const DECOY_SECRET: &str = "codegate-decoy-secret";

impl<K: ApiKeyRepository> AuthenticateRequestUseCase<K> {
    /// Resolve the signing key. Every rejection is the same `Unauthorized`; the cause
    /// is only logged at debug level.
    pub async fn execute(
        &self,
        request: SignedRequest<'_>,
        now: i64,
    ) -> Result<ApiKey, CodegateError> {
        let headers = request.headers;
        let key = self.keys.find_by_api_key(&headers.api_key).await?;

        let canonical = CanonicalRequest::from_raw(
            request.method,
            request.path,
            request.raw_query,
            request.body,
            headers.timestamp,
        );
        let secret = key.as_ref().map_or(DECOY_SECRET, |k| k.secret.as_str());
        let signature_matches = canonical.verify(secret, &headers.signature);
        let fresh = is_fresh(headers.timestamp, now, self.window_secs);

        let Some(key) = key else {
            debug!("signed request with unknown api key");
            return Err(CodegateError::Unauthorized);
        };
        if !key.is_active {
            debug!(api_key_id = %key.id, "signed request with inactive api key");
            return Err(CodegateError::Unauthorized);
        }
        if !fresh {
            debug!(timestamp = headers.timestamp, now, "signed request outside replay window");
            return Err(CodegateError::Unauthorized);
        }
        if !signature_matches {
            debug!(api_key_id = %key.id, "signature mismatch");
            return Err(CodegateError::Unauthorized);
        }
        Ok(key)
    }
}
