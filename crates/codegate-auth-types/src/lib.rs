//! Request authentication shared by the Codegate service and Rust clients.
//!
//! - [`signature`]: the HMAC-SHA256 canonical-request protocol used by SDK clients.
//! - [`headers`]: `X-API-Key` / `X-Timestamp` / `X-Signature` parsing.
//! - [`identity`]: admin identity injected by the console gateway.

pub mod headers;
pub mod identity;
pub mod signature;
