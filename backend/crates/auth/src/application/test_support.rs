//! In-memory gateway doubles for application-level scenario tests

use chrono::{DateTime, Utc};
use platform::kdf::{KdfDigest, KdfParams};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Notify;

use crate::domain::entity::{AdminEntry, EmergencyAdminRecord, Identity};
use crate::domain::gateway::{IdentityProvider, PersistenceMode, SessionBridge};
use crate::domain::value_object::AdminStatus;
use crate::error::{AuthError, AuthResult};
use crate::infra::secret_store::SecretStore;

/// Secret store in a temp directory, optionally provisioned with a record
///
/// Keeps the `TempDir` alive alongside the store; dropping it deletes the
/// files.
pub(crate) fn provisioned_store(credential: Option<(&str, &str)>) -> (TempDir, SecretStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SecretStore::at(dir.path());
    if let Some((username, password)) = credential {
        let params = KdfParams {
            iterations: 10_000,
            output_length: 32,
            digest: KdfDigest::Sha256,
        };
        let record = EmergencyAdminRecord::provision(username, password, params).unwrap();
        store.write_record(&record).unwrap();
    }
    (dir, store)
}

enum ProviderBehavior {
    Accept(String),
    Reject,
    Offline,
}

/// Identity provider double with a scripted outcome
pub(crate) struct MockProvider {
    behavior: ProviderBehavior,
    session: Mutex<Option<Identity>>,
    signed_out: AtomicBool,
    persistence: Mutex<PersistenceMode>,
    gate: Option<Arc<Notify>>,
}

impl MockProvider {
    fn new(behavior: ProviderBehavior) -> Self {
        Self {
            behavior,
            session: Mutex::new(None),
            signed_out: AtomicBool::new(false),
            persistence: Mutex::new(PersistenceMode::Local),
            gate: None,
        }
    }

    /// Accepts any credentials and reports this uid
    pub(crate) fn accepting(uid: &str) -> Self {
        Self::new(ProviderBehavior::Accept(uid.to_string()))
    }

    /// Rejects every credential pair
    pub(crate) fn rejecting() -> Self {
        Self::new(ProviderBehavior::Reject)
    }

    /// Fails every call at the transport level
    pub(crate) fn offline() -> Self {
        Self::new(ProviderBehavior::Offline)
    }

    /// Block every credential check until the gate is notified
    pub(crate) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Pre-open a session, as if a prior login is still alive
    pub(crate) fn with_session(self, identity: Identity) -> Self {
        *self.session.lock().unwrap() = Some(identity);
        self
    }

    pub(crate) fn signed_out(&self) -> bool {
        self.signed_out.load(Ordering::SeqCst)
    }

    pub(crate) fn persistence(&self) -> PersistenceMode {
        *self.persistence.lock().unwrap()
    }
}

impl IdentityProvider for MockProvider {
    async fn sign_in_with_password(&self, email: &str, _password: &str) -> AuthResult<Identity> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.behavior {
            ProviderBehavior::Accept(uid) => {
                let identity = Identity::new(uid.clone(), email);
                *self.session.lock().unwrap() = Some(identity.clone());
                Ok(identity)
            }
            ProviderBehavior::Reject => Err(AuthError::InvalidCredentials),
            ProviderBehavior::Offline => Err(AuthError::Network("connection refused".to_string())),
        }
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.signed_out.store(true, Ordering::SeqCst);
        self.session.lock().unwrap().take();
        Ok(())
    }

    async fn current_session(&self) -> AuthResult<Option<Identity>> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn set_persistence(&self, mode: PersistenceMode) -> AuthResult<()> {
        *self.persistence.lock().unwrap() = mode;
        Ok(())
    }
}

/// Session bridge double over in-memory maps
#[derive(Default)]
pub(crate) struct MockBridge {
    admins: Mutex<HashMap<String, AdminEntry>>,
    last_user: Mutex<Option<Identity>>,
    fail_tokens: bool,
}

impl MockBridge {
    pub(crate) fn with_admin(uid: &str, status: AdminStatus) -> Self {
        let bridge = Self::default();
        let mut entry = AdminEntry::new(format!("{uid}@example.com"));
        entry.status = status;
        bridge.admins.lock().unwrap().insert(uid.to_string(), entry);
        bridge
    }

    pub(crate) fn failing_tokens(mut self) -> Self {
        self.fail_tokens = true;
        self
    }

    pub(crate) fn set_last_user(&self, identity: Identity) {
        *self.last_user.lock().unwrap() = Some(identity);
    }

    pub(crate) fn last_user(&self) -> Option<Identity> {
        self.last_user.lock().unwrap().clone()
    }

    pub(crate) fn last_login(&self, uid: &str) -> Option<DateTime<Utc>> {
        self.admins
            .lock()
            .unwrap()
            .get(uid)
            .and_then(|entry| entry.last_login)
    }
}

impl SessionBridge for MockBridge {
    async fn fetch_admins(&self) -> AuthResult<HashMap<String, AdminEntry>> {
        Ok(self.admins.lock().unwrap().clone())
    }

    async fn create_custom_token(&self, uid: &str) -> AuthResult<String> {
        if self.fail_tokens {
            return Err(AuthError::Internal("token service down".to_string()));
        }
        Ok(format!("{uid}.mock-signature"))
    }

    async fn save_last_user(&self, identity: &Identity) -> AuthResult<()> {
        *self.last_user.lock().unwrap() = Some(identity.without_token());
        Ok(())
    }

    async fn get_last_user(&self) -> AuthResult<Option<Identity>> {
        Ok(self.last_user.lock().unwrap().clone())
    }

    async fn clear_last_user(&self) -> AuthResult<()> {
        self.last_user.lock().unwrap().take();
        Ok(())
    }

    async fn update_admin_last_login(&self, uid: &str, at: DateTime<Utc>) -> AuthResult<()> {
        if let Some(entry) = self.admins.lock().unwrap().get_mut(uid) {
            entry.last_login = Some(at);
        }
        Ok(())
    }
}
