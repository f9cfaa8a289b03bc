//! Sign Out Use Case
//!
//! Both steps are best-effort: a dead network must never trap the user
//! inside the dashboard, so this use case cannot fail.

use std::sync::Arc;

use crate::domain::gateway::{IdentityProvider, SessionBridge};
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<P, B>
where
    P: IdentityProvider,
    B: SessionBridge,
{
    provider: Arc<P>,
    bridge: Arc<B>,
}

impl<P, B> SignOutUseCase<P, B>
where
    P: IdentityProvider,
    B: SessionBridge,
{
    pub fn new(provider: Arc<P>, bridge: Arc<B>) -> Self {
        Self { provider, bridge }
    }

    pub async fn execute(&self) -> AuthResult<()> {
        if let Err(e) = self.provider.sign_out().await {
            tracing::warn!(error = %e, "Remote sign-out failed, continuing");
        }
        if let Err(e) = self.bridge.clear_last_user().await {
            tracing::warn!(error = %e, "Clearing last user failed, continuing");
        }
        tracing::info!("Administrator signed out");
        Ok(())
    }
}
