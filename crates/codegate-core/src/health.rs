use axum::http::StatusCode;

/// Liveness check for `GET /healthz`.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Map a dependency check to a readiness status. Services wrap this in their own
/// `GET /readyz` handler after pinging their backing stores.
pub fn readiness<E: std::fmt::Display>(check: Result<(), E>) -> StatusCode {
    match check {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
