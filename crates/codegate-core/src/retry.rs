//! Immediate retry for idempotent reads.
//!
//! Only connection-class failures are retried and there is no backoff sleep: the pool
//! hands out a fresh connection on the next attempt. Writes must never go through here;
//! a retried `verify` could double-apply.

use std::future::Future;

use sea_orm::DbErr;
use tracing::warn;

/// Total attempts for an idempotent read, including the first.
pub const READ_ATTEMPTS: u32 = 3;

/// Connection-level failures that a fresh pool connection may not repeat.
pub fn is_transient(err: &DbErr) -> bool {
    matches!(err, DbErr::ConnectionAcquire(_) | DbErr::Conn(_))
}

pub async fn retry_read<T, F, Fut>(label: &'static str, mut op: F) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if attempt < READ_ATTEMPTS && is_transient(&e) => {
                warn!(
                    op = label,
                    attempt,
                    max = READ_ATTEMPTS,
                    error = %e,
                    "transient storage error, retrying read"
                );
                attempt += 1;
            }
            other => return other,
        }
    }
}
