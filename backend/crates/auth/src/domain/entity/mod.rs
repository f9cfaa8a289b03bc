//! Domain Entities

pub mod admin_entry;
pub mod emergency_admin;
pub mod identity;

pub use admin_entry::AdminEntry;
pub use emergency_admin::EmergencyAdminRecord;
pub use identity::{BACKUP_ADMIN_UID, Identity};
