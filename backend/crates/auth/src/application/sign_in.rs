//! Sign In Use Case
//!
//! Authenticates an administrator: remote credential check first, then
//! the local emergency fallback when (and only when) the remote endpoint
//! rejected the credentials outright. A network failure never reaches
//! the fallback; the emergency credential is for "the backend says no",
//! not "the backend is down with valid credentials in hand".

use chrono::Utc;
use std::sync::Arc;

use crate::domain::entity::Identity;
use crate::domain::gateway::{IdentityProvider, SessionBridge};
use crate::domain::verifier;
use crate::error::{AuthError, AuthResult};
use crate::infra::secret_store::SecretStore;

/// Sign in input
pub struct SignInInput {
    /// Sign-in email; doubles as the fallback username
    pub username: String,
    /// Password
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    /// The authenticated identity
    pub identity: Identity,
    /// Whether the local emergency fallback produced this identity
    pub via_local_fallback: bool,
}

/// Sign in use case
pub struct SignInUseCase<P, B>
where
    P: IdentityProvider,
    B: SessionBridge,
{
    provider: Arc<P>,
    bridge: Arc<B>,
    store: Arc<SecretStore>,
}

impl<P, B> SignInUseCase<P, B>
where
    P: IdentityProvider,
    B: SessionBridge,
{
    pub fn new(provider: Arc<P>, bridge: Arc<B>, store: Arc<SecretStore>) -> Self {
        Self {
            provider,
            bridge,
            store,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        match self
            .provider
            .sign_in_with_password(&input.username, &input.password)
            .await
        {
            Ok(identity) => self.finish_remote(identity).await,
            Err(AuthError::InvalidCredentials) => self.try_local_fallback(&input).await,
            Err(e) => Err(e),
        }
    }

    /// Gate a remotely authenticated identity through the admin directory
    async fn finish_remote(&self, mut identity: Identity) -> AuthResult<SignInOutput> {
        let admins = self.bridge.fetch_admins().await?;

        let allowed = match admins.get(&identity.uid) {
            None => Err(AuthError::AccessDenied),
            Some(entry) if !entry.can_login() => Err(AuthError::AccountDisabled),
            Some(_) => Ok(()),
        };

        if let Err(denial) = allowed {
            // Authenticated but not welcome: tear the session down so the
            // next attempt starts clean
            tracing::warn!(uid = %identity.uid, error = %denial, "Admin directory denied login");
            if let Err(e) = self.provider.sign_out().await {
                tracing::warn!(error = %e, "Remote sign-out after denial failed");
            }
            if let Err(e) = self.bridge.clear_last_user().await {
                tracing::warn!(error = %e, "Clearing last user after denial failed");
            }
            return Err(denial);
        }

        // Best-effort steps: none of these may fail the sign-in
        if let Err(e) = self
            .bridge
            .update_admin_last_login(&identity.uid, Utc::now())
            .await
        {
            tracing::warn!(error = %e, "Last-login update failed");
        }
        if let Err(e) = self.bridge.save_last_user(&identity).await {
            tracing::warn!(error = %e, "Persisting last user failed");
        }
        match self.bridge.create_custom_token(&identity.uid).await {
            Ok(token) => identity.custom_token = Some(token),
            Err(e) => {
                tracing::warn!(error = %e, "Custom token issuance failed");
            }
        }

        tracing::info!(uid = %identity.uid, "Administrator signed in");
        Ok(SignInOutput {
            identity,
            via_local_fallback: false,
        })
    }

    /// Check the rejected credentials against the local emergency record
    ///
    /// Every failure inside here collapses to `InvalidCredentials`; the
    /// login form must not reveal whether an emergency record exists.
    async fn try_local_fallback(&self, input: &SignInInput) -> AuthResult<SignInOutput> {
        let record = match self.store.read_record() {
            Ok(Some(record)) => record,
            Ok(None) => return Err(AuthError::InvalidCredentials),
            Err(e) => {
                e.log();
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verifier::verify(&input.username, &input.password, &record) {
            return Err(AuthError::InvalidCredentials);
        }

        let identity = Identity::backup_admin(record.username.clone());
        tracing::warn!(
            username = %record.username,
            "Signed in via local emergency credential"
        );
        Ok(SignInOutput {
            identity,
            via_local_fallback: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MockBridge, MockProvider, provisioned_store};
    use crate::domain::entity::BACKUP_ADMIN_UID;
    use crate::domain::value_object::AdminStatus;

    fn use_case(
        provider: MockProvider,
        bridge: MockBridge,
        store: SecretStore,
    ) -> SignInUseCase<MockProvider, MockBridge> {
        SignInUseCase::new(Arc::new(provider), Arc::new(bridge), Arc::new(store))
    }

    fn input(username: &str, password: &str) -> SignInInput {
        SignInInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_active_admin_signs_in() {
        let (_dir, store) = provisioned_store(None);
        let provider = MockProvider::accepting("uid-1");
        let bridge = MockBridge::with_admin("uid-1", AdminStatus::Active);
        let uc = use_case(provider, bridge, store);

        let output = uc.execute(input("a@example.com", "pw")).await.unwrap();
        assert!(!output.via_local_fallback);
        assert_eq!(output.identity.uid, "uid-1");
        // Token was minted and the last user persisted
        assert!(output.identity.custom_token.is_some());
        assert!(uc.bridge.last_user().is_some());
    }

    #[tokio::test]
    async fn test_disabled_admin_is_denied_and_signed_out() {
        let (_dir, store) = provisioned_store(None);
        let provider = MockProvider::accepting("uid-1");
        let bridge = MockBridge::with_admin("uid-1", AdminStatus::Disabled);
        let uc = use_case(provider, bridge, store);

        let err = uc.execute(input("a@example.com", "pw")).await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDisabled));
        assert!(uc.provider.signed_out());
        assert!(uc.bridge.last_user().is_none());
    }

    #[tokio::test]
    async fn test_unlisted_account_is_denied_and_signed_out() {
        let (_dir, store) = provisioned_store(None);
        let provider = MockProvider::accepting("uid-9");
        let bridge = MockBridge::with_admin("uid-1", AdminStatus::Active);
        let uc = use_case(provider, bridge, store);

        let err = uc.execute(input("x@example.com", "pw")).await.unwrap_err();
        assert!(matches!(err, AuthError::AccessDenied));
        assert!(uc.provider.signed_out());
    }

    #[tokio::test]
    async fn test_fallback_on_rejected_credentials() {
        let (_dir, store) = provisioned_store(Some(("admin@local", "secret123")));
        let provider = MockProvider::rejecting();
        let bridge = MockBridge::default();
        let uc = use_case(provider, bridge, store);

        let output = uc.execute(input("admin@local", "secret123")).await.unwrap();
        assert!(output.via_local_fallback);
        assert_eq!(output.identity.uid, BACKUP_ADMIN_UID);
        assert_eq!(output.identity.email, "admin@local");
        // Remote-only steps are skipped on the fallback path
        assert!(uc.bridge.last_user().is_none());
    }

    #[tokio::test]
    async fn test_fallback_requires_exact_username() {
        let (_dir, store) = provisioned_store(Some(("admin@local", "secret123")));
        let uc = use_case(MockProvider::rejecting(), MockBridge::default(), store);

        let err = uc
            .execute(input("Admin@local", "secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_no_record_means_plain_rejection() {
        let (_dir, store) = provisioned_store(None);
        let uc = use_case(MockProvider::rejecting(), MockBridge::default(), store);

        let err = uc
            .execute(input("admin@local", "secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_network_failure_never_reaches_fallback() {
        let (_dir, store) = provisioned_store(Some(("admin@local", "secret123")));
        let uc = use_case(MockProvider::offline(), MockBridge::default(), store);

        let err = uc
            .execute(input("admin@local", "secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
    }

    #[tokio::test]
    async fn test_corrupt_store_collapses_to_invalid_credentials() {
        let (dir, store) = provisioned_store(Some(("admin@local", "secret123")));
        std::fs::write(store.record_path(), b"{ not an envelope").unwrap();
        let uc = use_case(MockProvider::rejecting(), MockBridge::default(), store);

        let err = uc
            .execute(input("admin@local", "secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        drop(dir);
    }

    #[tokio::test]
    async fn test_token_failure_is_not_fatal() {
        let (_dir, store) = provisioned_store(None);
        let provider = MockProvider::accepting("uid-1");
        let bridge = MockBridge::with_admin("uid-1", AdminStatus::Active).failing_tokens();
        let uc = use_case(provider, bridge, store);

        let output = uc.execute(input("a@example.com", "pw")).await.unwrap();
        assert!(output.identity.custom_token.is_none());
    }
}
