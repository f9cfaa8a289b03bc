//! Domain Value Objects

pub mod admin_status;

pub use admin_status::AdminStatus;
