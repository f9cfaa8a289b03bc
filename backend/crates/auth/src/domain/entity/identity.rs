//! Authenticated Identity Entity

use serde::{Deserialize, Serialize};

/// Fixed uid of the synthetic identity produced by the local fallback
pub const BACKUP_ADMIN_UID: &str = "backup-admin";

/// An authenticated user as seen by the console
///
/// Produced either by the remote identity provider or synthesized by the
/// local emergency fallback. Field names match the persisted last-user
/// JSON written by the session bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable user identifier
    pub uid: String,
    /// Sign-in email (the emergency record's username for fallback logins)
    pub email: String,
    /// Optional display name from the provider profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Short-lived custom token minted after the admin check; never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_token: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: None,
            custom_token: None,
        }
    }

    /// Synthetic identity for a verified emergency credential
    pub fn backup_admin(email: impl Into<String>) -> Self {
        Self::new(BACKUP_ADMIN_UID, email)
    }

    /// Check whether this identity came from the local fallback
    #[inline]
    pub fn is_backup_admin(&self) -> bool {
        self.uid == BACKUP_ADMIN_UID
    }

    /// Copy without the short-lived token, for persistence
    pub fn without_token(&self) -> Self {
        Self {
            custom_token: None,
            ..self.clone()
        }
    }
}
