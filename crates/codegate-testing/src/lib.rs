//! Test utilities for Codegate services.
//!
//! Provides `MockAdmin` (gateway identity headers) and `TestSigner` (SDK request
//! signatures). Import from `[dev-dependencies]` only.

pub mod auth;
pub mod signer;
