// Module name shadows the `serde` crate; use `::serde` for the external crate.
use ::serde::Serializer;
use chrono::{DateTime, Utc};

/// Serialize `DateTime<Utc>` as Unix seconds. Every timestamp on the wire uses this.
pub fn to_unix_secs<S>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_i64(dt.timestamp())
}

/// Optional variant of [`to_unix_secs`]; `None` serializes as `null`.
pub fn to_unix_secs_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_some(&dt.timestamp()),
        None => s.serialize_none(),
    }
}

/// Parse Unix seconds from a request field. Out-of-range values yield `None`.
pub fn from_unix_secs(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}
