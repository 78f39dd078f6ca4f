//! Domain types shared across Codegate crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers freely; `infra/` unwraps the newtypes at the
//! storage boundary.

pub mod id;
pub mod pagination;
