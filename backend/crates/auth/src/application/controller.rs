//! Auth Controller
//!
//! Single owner of the authentication lifecycle: holds the current
//! [`AuthState`], serializes sign-in attempts behind an in-flight guard,
//! publishes [`AuthEvent`]s, and runs the inactivity monitor while the
//! dashboard is open.
//!
//! State transitions:
//!
//! ```text
//! LoggedOut -> Authenticating -> DashboardActive
//!     ^              |                 |
//!     +--- failure --+                 |
//!     +---- sign-out / expiry ---------+
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, mpsc};
use tokio::time;

use crate::application::auto_login::AutoLoginUseCase;
use crate::application::config::AuthConfig;
use crate::application::events::{AuthEvent, AuthEvents};
use crate::application::sign_in::{SignInInput, SignInUseCase};
use crate::application::sign_out::SignOutUseCase;
use crate::domain::entity::Identity;
use crate::domain::gateway::{IdentityProvider, SessionBridge};
use crate::error::{AuthError, AuthResult};
use crate::infra::secret_store::SecretStore;
use crate::monitor::{ActivitySignal, InactivityMonitor, MonitorEvent};

/// Where the console currently stands
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// Login form is showing
    LoggedOut,
    /// A sign-in attempt is running
    Authenticating,
    /// An administrator is in the dashboard
    DashboardActive { identity: Identity },
}

/// Authentication lifecycle controller
pub struct AuthController<P, B>
where
    P: IdentityProvider + Send + Sync + 'static,
    B: SessionBridge + Send + Sync + 'static,
{
    provider: Arc<P>,
    sign_in_uc: SignInUseCase<P, B>,
    auto_login_uc: AutoLoginUseCase<P, B>,
    sign_out_uc: SignOutUseCase<P, B>,
    config: AuthConfig,
    events: AuthEvents,
    state: Mutex<AuthState>,
    in_flight: AtomicBool,
    monitor: Mutex<Option<InactivityMonitor>>,
}

impl<P, B> AuthController<P, B>
where
    P: IdentityProvider + Send + Sync + 'static,
    B: SessionBridge + Send + Sync + 'static,
{
    /// Wire up the controller; fails if the monitor timing is invalid
    pub fn new(
        provider: Arc<P>,
        bridge: Arc<B>,
        store: Arc<SecretStore>,
        config: AuthConfig,
    ) -> AuthResult<Arc<Self>> {
        config
            .monitor
            .validate()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(Arc::new(Self {
            provider: Arc::clone(&provider),
            sign_in_uc: SignInUseCase::new(
                Arc::clone(&provider),
                Arc::clone(&bridge),
                Arc::clone(&store),
            ),
            auto_login_uc: AutoLoginUseCase::new(Arc::clone(&provider), Arc::clone(&bridge)),
            sign_out_uc: SignOutUseCase::new(provider, bridge),
            config,
            events: AuthEvents::default(),
            state: Mutex::new(AuthState::LoggedOut),
            in_flight: AtomicBool::new(false),
            monitor: Mutex::new(None),
        }))
    }

    /// Current state snapshot
    pub fn state(&self) -> AuthState {
        self.state.lock().unwrap().clone()
    }

    /// Subscribe to the auth event stream
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Interactive sign-in from the login form
    ///
    /// A second call while one attempt runs is rejected with
    /// [`AuthError::SignInInFlight`]; the first attempt is unaffected.
    pub async fn sign_in(self: &Arc<Self>, username: &str, password: &str) -> AuthResult<Identity> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(AuthError::SignInInFlight);
        }

        self.set_state(AuthState::Authenticating);
        if let Err(e) = self.provider.set_persistence(self.config.persistence).await {
            tracing::warn!(error = %e, "Setting session persistence failed");
        }

        let result = self
            .sign_in_uc
            .execute(SignInInput {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await;
        self.in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(output) => {
                self.enter_dashboard(output.identity.clone());
                Ok(output.identity)
            }
            Err(e) => {
                self.set_state(AuthState::LoggedOut);
                e.log();
                Err(e)
            }
        }
    }

    /// Silent login on startup
    ///
    /// On success the dashboard reveal is delayed by the configured pause
    /// so the window does not flash past the login form.
    pub async fn try_auto_login(self: &Arc<Self>) -> AuthResult<Option<Identity>> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(AuthError::SignInInFlight);
        }

        if let Err(e) = self.provider.set_persistence(self.config.persistence).await {
            tracing::warn!(error = %e, "Setting session persistence failed");
        }

        let result = self.auto_login_uc.execute().await;
        self.in_flight.store(false, Ordering::SeqCst);

        match result {
            Ok(Some(output)) => {
                if !self.config.reveal_delay.is_zero() {
                    time::sleep(self.config.reveal_delay).await;
                }
                self.enter_dashboard(output.identity.clone());
                Ok(Some(output.identity))
            }
            Ok(None) => {
                self.set_state(AuthState::LoggedOut);
                Ok(None)
            }
            Err(e) => {
                self.set_state(AuthState::LoggedOut);
                e.log();
                Err(e)
            }
        }
    }

    /// Explicit sign-out from the dashboard
    pub async fn sign_out(&self) -> AuthResult<()> {
        self.stop_monitor().await;
        self.sign_out_uc.execute().await?;
        self.set_state(AuthState::LoggedOut);
        Ok(())
    }

    /// Forward a user activity signal to the monitor
    pub fn record_activity(&self, signal: ActivitySignal) {
        if let Some(monitor) = &*self.monitor.lock().unwrap() {
            monitor.record_activity(signal);
        }
    }

    /// Dismiss the inactivity warning
    pub fn stay_signed_in(&self) {
        if let Some(monitor) = &*self.monitor.lock().unwrap() {
            monitor.stay_signed_in();
        }
    }

    fn set_state(&self, state: AuthState) {
        *self.state.lock().unwrap() = state.clone();
        self.events.emit(AuthEvent::StateChanged(state));
    }

    fn enter_dashboard(self: &Arc<Self>, identity: Identity) {
        self.set_state(AuthState::DashboardActive { identity });

        let (tx, mut rx) = mpsc::unbounded_channel();
        match InactivityMonitor::start(self.config.monitor, tx) {
            Ok(monitor) => {
                *self.monitor.lock().unwrap() = Some(monitor);
            }
            Err(e) => {
                // Unreachable in practice, the config was validated in new()
                tracing::error!(error = %e, "Inactivity monitor failed to start");
                return;
            }
        }

        let controller = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    MonitorEvent::Warning { remaining_secs } => {
                        controller
                            .events
                            .emit(AuthEvent::InactivityWarning { remaining_secs });
                    }
                    MonitorEvent::Tick { remaining_secs } => {
                        controller
                            .events
                            .emit(AuthEvent::InactivityTick { remaining_secs });
                    }
                    MonitorEvent::Expired => {
                        controller.expire().await;
                        return;
                    }
                }
            }
        });
    }

    /// Inactivity expiry: tear everything down and return to login
    async fn expire(&self) {
        tracing::info!("Session expired from inactivity");
        self.events.emit(AuthEvent::SessionExpired);
        self.monitor.lock().unwrap().take();
        if let Err(e) = self.sign_out_uc.execute().await {
            tracing::warn!(error = %e, "Sign-out after expiry failed");
        }
        self.set_state(AuthState::LoggedOut);
    }

    async fn stop_monitor(&self) {
        let monitor = self.monitor.lock().unwrap().take();
        if let Some(monitor) = monitor {
            monitor.stop().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{MockBridge, MockProvider, provisioned_store};
    use crate::domain::gateway::PersistenceMode;
    use crate::domain::value_object::AdminStatus;
    use crate::monitor::MonitorConfig;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn fast_config() -> AuthConfig {
        AuthConfig {
            monitor: MonitorConfig {
                timeout: Duration::from_millis(1000),
                warning: Duration::from_millis(400),
            },
            ..AuthConfig::development()
        }
    }

    fn controller(
        provider: MockProvider,
        bridge: MockBridge,
        config: AuthConfig,
    ) -> (tempfile::TempDir, Arc<AuthController<MockProvider, MockBridge>>) {
        let (dir, store) = provisioned_store(None);
        let ctrl =
            AuthController::new(Arc::new(provider), Arc::new(bridge), Arc::new(store), config)
                .unwrap();
        (dir, ctrl)
    }

    fn drain(rx: &mut broadcast::Receiver<AuthEvent>) -> Vec<AuthEvent> {
        let mut out = Vec::new();
        while let Ok(event) = rx.try_recv() {
            out.push(event);
        }
        out
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_sign_in_reaches_dashboard() {
        let (_dir, ctrl) = controller(
            MockProvider::accepting("uid-1"),
            MockBridge::with_admin("uid-1", AdminStatus::Active),
            fast_config(),
        );
        let mut rx = ctrl.subscribe();

        let identity = ctrl.sign_in("a@example.com", "pw").await.unwrap();
        assert_eq!(identity.uid, "uid-1");
        assert!(matches!(ctrl.state(), AuthState::DashboardActive { .. }));

        let events = drain(&mut rx);
        assert!(matches!(
            events.as_slice(),
            [
                AuthEvent::StateChanged(AuthState::Authenticating),
                AuthEvent::StateChanged(AuthState::DashboardActive { .. }),
            ]
        ));
    }

    #[tokio::test]
    async fn test_failed_sign_in_returns_to_logged_out() {
        let (_dir, ctrl) = controller(
            MockProvider::rejecting(),
            MockBridge::default(),
            fast_config(),
        );

        let err = ctrl.sign_in("a@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(ctrl.state(), AuthState::LoggedOut);
    }

    #[tokio::test]
    async fn test_sign_in_applies_configured_persistence() {
        let config = AuthConfig {
            persistence: PersistenceMode::Session,
            ..fast_config()
        };
        let (_dir, ctrl) = controller(
            MockProvider::accepting("uid-1"),
            MockBridge::with_admin("uid-1", AdminStatus::Active),
            config,
        );
        ctrl.sign_in("a@example.com", "pw").await.unwrap();
        assert_eq!(ctrl.provider.persistence(), PersistenceMode::Session);
    }

    #[tokio::test]
    async fn test_concurrent_sign_in_is_rejected() {
        let gate = Arc::new(Notify::new());
        let provider = MockProvider::accepting("uid-1").gated(Arc::clone(&gate));
        let (_dir, ctrl) = controller(
            provider,
            MockBridge::with_admin("uid-1", AdminStatus::Active),
            fast_config(),
        );

        let first = {
            let ctrl = Arc::clone(&ctrl);
            tokio::spawn(async move { ctrl.sign_in("a@example.com", "pw").await })
        };
        settle().await;

        // Second submission while the first is stuck at the provider
        let err = ctrl.sign_in("a@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::SignInInFlight));

        gate.notify_one();
        assert!(first.await.unwrap().is_ok());
        assert!(matches!(ctrl.state(), AuthState::DashboardActive { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_inactivity_expiry_signs_out() {
        let (_dir, ctrl) = controller(
            MockProvider::accepting("uid-1"),
            MockBridge::with_admin("uid-1", AdminStatus::Active),
            fast_config(),
        );
        ctrl.sign_in("a@example.com", "pw").await.unwrap();
        let mut rx = ctrl.subscribe();
        settle().await;

        time::advance(Duration::from_millis(1000)).await;
        settle().await;

        let events = drain(&mut rx);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, AuthEvent::InactivityWarning { .. }))
        );
        assert!(events.contains(&AuthEvent::SessionExpired));
        assert_eq!(ctrl.state(), AuthState::LoggedOut);
        assert!(ctrl.provider.signed_out());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stay_signed_in_keeps_the_dashboard() {
        let (_dir, ctrl) = controller(
            MockProvider::accepting("uid-1"),
            MockBridge::with_admin("uid-1", AdminStatus::Active),
            fast_config(),
        );
        ctrl.sign_in("a@example.com", "pw").await.unwrap();
        settle().await;

        time::advance(Duration::from_millis(600)).await;
        settle().await;
        ctrl.stay_signed_in();
        settle().await;

        time::advance(Duration::from_millis(500)).await;
        settle().await;
        assert!(matches!(ctrl.state(), AuthState::DashboardActive { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_stops_the_monitor() {
        let (_dir, ctrl) = controller(
            MockProvider::accepting("uid-1"),
            MockBridge::with_admin("uid-1", AdminStatus::Active),
            fast_config(),
        );
        ctrl.sign_in("a@example.com", "pw").await.unwrap();
        settle().await;

        ctrl.sign_out().await.unwrap();
        let mut rx = ctrl.subscribe();

        time::advance(Duration::from_secs(5)).await;
        settle().await;
        assert!(drain(&mut rx).is_empty());
        assert_eq!(ctrl.state(), AuthState::LoggedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_login_waits_for_the_reveal_delay() {
        let identity = Identity::new("uid-1", "a@example.com");
        let provider = MockProvider::accepting("uid-1").with_session(identity.clone());
        let bridge = MockBridge::with_admin("uid-1", AdminStatus::Active);
        bridge.set_last_user(identity);

        let config = AuthConfig {
            reveal_delay: Duration::from_millis(3500),
            ..fast_config()
        };
        let (_dir, ctrl) = controller(provider, bridge, config);

        let started = time::Instant::now();
        let result = ctrl.try_auto_login().await.unwrap();
        assert!(result.is_some());
        assert!(started.elapsed() >= Duration::from_millis(3500));
        assert!(matches!(ctrl.state(), AuthState::DashboardActive { .. }));
    }

    #[tokio::test]
    async fn test_auto_login_without_last_user_stays_logged_out() {
        let (_dir, ctrl) = controller(
            MockProvider::accepting("uid-1"),
            MockBridge::with_admin("uid-1", AdminStatus::Active),
            fast_config(),
        );
        assert!(ctrl.try_auto_login().await.unwrap().is_none());
        assert_eq!(ctrl.state(), AuthState::LoggedOut);
    }
}
