//! HTTP and storage plumbing shared by Codegate services.

pub mod config;
pub mod health;
pub mod middleware;
pub mod retry;
pub mod sea_ext;
pub mod serde;
pub mod tracing;
