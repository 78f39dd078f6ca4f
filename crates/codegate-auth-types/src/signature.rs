//! HMAC-SHA256 request signing.
//!
//! Canonical string, one field per line:
//!
//! ```text
//! METHOD
//! PATH
//! SORTED_QUERY
//! BODY_SHA256_HEX
//! TIMESTAMP
//! ```
//!
//! `SORTED_QUERY` is the decoded query, pairs sorted by key (then value), re-encoded the
//! way Python's `urllib.parse.quote_plus` does: alphanumerics and `_.-~` stay literal, a
//! space becomes `+`, everything else is `%XX`. Wire order and wire encoding never change
//! the signature. An absent or empty body hashes to [`EMPTY_BODY_SHA256`]. The signature
//! is the lowercase hex HMAC of the canonical string keyed by the API secret.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use url::form_urlencoded;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 of zero bytes. Used verbatim for requests without a body.
pub const EMPTY_BODY_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Default maximum skew between the signed timestamp and the server clock, either way.
pub const DEFAULT_REPLAY_WINDOW_SECS: u64 = 300;

/// Hex SHA-256 of the raw body bytes.
pub fn body_sha256_hex(body: &[u8]) -> String {
    if body.is_empty() {
        return EMPTY_BODY_SHA256.to_owned();
    }
    hex::encode(Sha256::digest(body))
}

/// Percent-encode one query component, space as `+`.
fn quote_plus(component: &str) -> String {
    // `%20` only ever comes from a space: a literal `%` is itself encoded as `%25`.
    urlencoding::encode(component).replace("%20", "+")
}

/// Canonicalize decoded query pairs: sort, then encode each key and value.
pub fn sorted_query<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
    pairs.sort_unstable();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", quote_plus(k), quote_plus(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Canonicalize a raw query string as received on the wire (without the leading `?`).
pub fn sorted_raw_query(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|q| !q.is_empty()) else {
        return String::new();
    };
    let decoded: Vec<(String, String)> = form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    sorted_query(decoded.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// One request, reduced to the fields the signature covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    pub method: String,
    pub path: String,
    pub sorted_query: String,
    pub body_sha256: String,
    pub timestamp: i64,
}

impl CanonicalRequest {
    /// Build from what the server actually received: raw query string and raw body bytes.
    pub fn from_raw(
        method: &str,
        path: &str,
        raw_query: Option<&str>,
        body: &[u8],
        timestamp: i64,
    ) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_owned(),
            sorted_query: sorted_raw_query(raw_query),
            body_sha256: body_sha256_hex(body),
            timestamp,
        }
    }

    /// Build from decoded query pairs, as a client does before sending.
    pub fn from_pairs<'a, I>(method: &str, path: &str, query: I, body: &[u8], timestamp: i64) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_owned(),
            sorted_query: sorted_query(query),
            body_sha256: body_sha256_hex(body),
            timestamp,
        }
    }

    pub fn to_canonical_string(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}",
            self.method, self.path, self.sorted_query, self.body_sha256, self.timestamp
        )
    }

    /// Lowercase 64-hex signature under `secret`.
    pub fn sign(&self, secret: &str) -> String {
        hex::encode(mac(secret, &self.to_canonical_string()))
    }

    /// Constant-time check of a presented hex signature.
    pub fn verify(&self, secret: &str, presented: &str) -> bool {
        let expected = mac(secret, &self.to_canonical_string());
        let Ok(presented) = hex::decode(presented) else {
            return false;
        };
        expected.as_slice().ct_eq(presented.as_slice()).into()
    }
}

fn mac(secret: &str, canonical: &str) -> Vec<u8> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(canonical.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// `|now - timestamp| <= window`, checked in both directions.
pub fn is_fresh(timestamp: i64, now: i64, window_secs: u64) -> bool {
    now.abs_diff(timestamp) <= window_secs
}
