//! sea-orm entities for the Codegate database.

pub mod api_keys;
pub mod codes;
pub mod projects;
pub mod verification_logs;
