//! Administrator Status Value Object
//!
//! Simplified status management for the administrator directory.
//!
//! ## Design Decisions
//! - **2 statuses only**: Active, Disabled
//! - **No soft delete**: removing an administrator deletes the directory
//!   entry; an absent entry denies login the same way Disabled does
//! - Stored as a capitalized string code in the directory, matching what
//!   the management tooling writes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Administrator account status
///
/// Gates entry to the dashboard after a successful credential check:
/// - **Active**: may open the dashboard
/// - **Disabled**: authenticated but denied, session is torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdminStatus {
    /// Normal administrator - login allowed
    #[default]
    Active,

    /// Disabled administrator - authenticated sessions are rejected
    Disabled,
}

impl AdminStatus {
    /// Get string code as stored in the directory
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Disabled => "Disabled",
        }
    }

    /// Check if login is allowed
    #[inline]
    pub const fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Create from string code
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Active" => Some(Self::Active),
            "Disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
