//! Gateway Traits
//!
//! Interfaces to the remote identity endpoint and the session bridge.
//! Implementations live in the infrastructure layer; use cases depend
//! only on these traits so tests can substitute in-memory doubles.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::domain::entity::{AdminEntry, Identity};
use crate::error::AuthResult;

/// How the identity provider should persist its own session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistenceMode {
    /// Survive application restarts
    #[default]
    Local,
    /// In-memory only, dropped on exit
    Session,
}

/// Remote identity endpoint (credential verification)
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Verify an email/password pair and open a provider session
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Identity>;

    /// Tear down the provider session
    async fn sign_out(&self) -> AuthResult<()>;

    /// Identity of the current provider session, if any
    async fn current_session(&self) -> AuthResult<Option<Identity>>;

    /// Select how the provider session is persisted
    async fn set_persistence(&self, mode: PersistenceMode) -> AuthResult<()>;
}

/// Privileged session operations
///
/// One implementation talks to the elevated helper process; another goes
/// directly to the data backend when the helper is absent. The fallback
/// adapter composes the two behind this same trait.
#[trait_variant::make(SessionBridge: Send)]
pub trait LocalSessionBridge {
    /// Fetch the administrator directory, keyed by uid
    async fn fetch_admins(&self) -> AuthResult<HashMap<String, AdminEntry>>;

    /// Mint a short-lived custom token for the given uid
    async fn create_custom_token(&self, uid: &str) -> AuthResult<String>;

    /// Persist the last successfully signed-in user
    async fn save_last_user(&self, identity: &Identity) -> AuthResult<()>;

    /// Load the persisted last user, if any
    async fn get_last_user(&self) -> AuthResult<Option<Identity>>;

    /// Remove the persisted last user
    async fn clear_last_user(&self) -> AuthResult<()>;

    /// Stamp the directory entry with a successful login time
    async fn update_admin_last_login(&self, uid: &str, at: DateTime<Utc>) -> AuthResult<()>;
}
