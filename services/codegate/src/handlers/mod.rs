pub mod api_keys;
pub mod codes;
pub mod health;
pub mod logs;
pub mod projects;
pub mod sdk;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};

use codegate_core::serde::from_unix_secs;

use crate::error::CodegateError;

/// Parse a raw query string with `serde_qs`; an absent query yields the default.
pub(crate) fn parse_query<T>(raw: Option<&str>) -> Result<T, CodegateError>
where
    T: DeserializeOwned + Default,
{
    raw.filter(|q| !q.is_empty())
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|e| CodegateError::validation(format!("invalid query: {e}")))
        .map(Option::unwrap_or_default)
}

pub(crate) fn parse_unix_secs(secs: i64) -> Result<DateTime<Utc>, CodegateError> {
    from_unix_secs(secs).ok_or_else(|| CodegateError::validation("timestamp out of range"))
}

/// Tell an absent field (`None`) apart from an explicit `null` (`Some(None)`).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
