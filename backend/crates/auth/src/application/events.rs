//! Auth Event Stream
//!
//! Typed broadcast channel the UI surface subscribes to. A single
//! emitter replaces scattered listener registries; subscribers that lag
//! behind simply miss events, which is acceptable for UI notifications.

use tokio::sync::broadcast;

use crate::application::controller::AuthState;

/// Events published by the auth controller
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// The controller moved to a new state
    StateChanged(AuthState),
    /// Inactivity warning opened with this many seconds left
    InactivityWarning { remaining_secs: u64 },
    /// One countdown second elapsed
    InactivityTick { remaining_secs: u64 },
    /// The inactivity timeout expired; sign-out follows
    SessionExpired,
}

/// Broadcast emitter for [`AuthEvent`]
#[derive(Debug, Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Open a new subscription; only events after this call are seen
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Publish an event; having no subscribers is fine
    pub(crate) fn emit(&self, event: AuthEvent) {
        tracing::trace!(?event, "Auth event");
        let _ = self.tx.send(event);
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new(64)
    }
}
