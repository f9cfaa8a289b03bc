//! Administrator Directory Entry Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::AdminStatus;

/// One entry in the administrator directory, keyed by uid
///
/// The directory is the authority on who may open the dashboard; a
/// successful credential check alone is not enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEntry {
    /// Whether this administrator may log in
    pub status: AdminStatus,
    /// Contact email recorded in the directory
    pub email: String,
    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Last successful dashboard login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl AdminEntry {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            status: AdminStatus::Active,
            email: email.into(),
            display_name: None,
            last_login: None,
        }
    }

    /// Check if login is allowed
    #[inline]
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }
}
