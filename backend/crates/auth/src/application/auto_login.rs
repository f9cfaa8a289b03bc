//! Auto Login Use Case
//!
//! Silent re-entry on startup: when a persisted last user exists and the
//! provider still holds a matching session, the admin gate runs without
//! any credential entry. Anything that goes wrong short of an explicit
//! directory denial just lands on the ordinary login form.

use chrono::Utc;
use std::sync::Arc;

use crate::application::sign_in::SignInOutput;
use crate::domain::gateway::{IdentityProvider, SessionBridge};
use crate::error::{AuthError, AuthResult};

/// Auto login use case
pub struct AutoLoginUseCase<P, B>
where
    P: IdentityProvider,
    B: SessionBridge,
{
    provider: Arc<P>,
    bridge: Arc<B>,
}

impl<P, B> AutoLoginUseCase<P, B>
where
    P: IdentityProvider,
    B: SessionBridge,
{
    pub fn new(provider: Arc<P>, bridge: Arc<B>) -> Self {
        Self { provider, bridge }
    }

    /// `Ok(None)` means "show the login form"; only a directory denial
    /// surfaces as an error
    pub async fn execute(&self) -> AuthResult<Option<SignInOutput>> {
        let last = match self.bridge.get_last_user().await {
            Ok(Some(last)) => last,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::warn!(error = %e, "Last-user lookup failed, skipping auto-login");
                return Ok(None);
            }
        };

        let session = match self.provider.current_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Session probe failed, skipping auto-login");
                return Ok(None);
            }
        };

        let mut identity = match session {
            Some(identity) if identity.uid == last.uid => identity,
            _ => return Ok(None),
        };

        // Same gate as interactive sign-in
        let admins = match self.bridge.fetch_admins().await {
            Ok(admins) => admins,
            Err(e) => {
                tracing::warn!(error = %e, "Directory fetch failed, skipping auto-login");
                return Ok(None);
            }
        };

        let allowed = match admins.get(&identity.uid) {
            None => Err(AuthError::AccessDenied),
            Some(entry) if !entry.can_login() => Err(AuthError::AccountDisabled),
            Some(_) => Ok(()),
        };

        if let Err(denial) = allowed {
            tracing::warn!(uid = %identity.uid, error = %denial, "Admin directory denied auto-login");
            if let Err(e) = self.provider.sign_out().await {
                tracing::warn!(error = %e, "Remote sign-out after denial failed");
            }
            if let Err(e) = self.bridge.clear_last_user().await {
                tracing::warn!(error = %e, "Clearing last user after denial failed");
            }
            return Err(denial);
        }

        if let Err(e) = self
            .bridge
            .update_admin_last_login(&identity.uid, Utc::now())
            .await
        {
            tracing::warn!(error = %e, "Last-login update failed");
        }
        match self.bridge.create_custom_token(&identity.uid).await {
            Ok(token) => identity.custom_token = Some(token),
            Err(e) => {
                tracing::warn!(error = %e, "Custom token issuance failed");
            }
        }

        tracing::info!(uid = %identity.uid, "Administrator auto-logged in");
        Ok(Some(SignInOutput {
            identity,
            via_local_fallback: false,
        }))
    }
}
