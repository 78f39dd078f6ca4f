use serde::Deserialize;

use codegate_auth_types::signature::DEFAULT_REPLAY_WINDOW_SECS;
use codegate_core::config::Config;

use crate::domain::types::DEFAULT_CODE_LENGTH;

/// Codegate service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct CodegateConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on. Env var: `CODEGATE_PORT`.
    #[serde(default = "default_port")]
    pub codegate_port: u16,
    /// Maximum skew, either way, between `X-Timestamp` and the server clock.
    #[serde(default = "default_signature_window")]
    pub signature_window_secs: u64,
    /// Upper bound on a signed request body; the whole body is buffered for hashing.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Default total code length, prefix and suffix included.
    #[serde(default = "default_code_length")]
    pub code_length: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Verify attempts allowed per client IP per minute, across admin and SDK. 0 disables.
    #[serde(default = "default_verify_rate_limit")]
    pub verify_rate_limit_per_minute: u32,
}

impl Config for CodegateConfig {}

fn default_port() -> u16 {
    3120
}

fn default_signature_window() -> u64 {
    DEFAULT_REPLAY_WINDOW_SECS
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_code_length() -> usize {
    DEFAULT_CODE_LENGTH
}

fn default_request_timeout() -> u64 {
    30
}

fn default_verify_rate_limit() -> u32 {
    60
}
