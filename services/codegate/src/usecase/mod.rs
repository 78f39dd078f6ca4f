pub mod api_key;
pub mod code;
pub mod generator;
pub mod log;
pub mod project;
pub mod signature;
pub mod verify;
