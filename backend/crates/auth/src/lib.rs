//! Auth Crate - Console Authentication
//!
//! Client-side authentication for the admin console, including the
//! machine-local emergency fallback:
//!
//! - **domain**: entities, the administrator status gate, the credential
//!   verifier, and the gateway traits
//! - **application**: sign-in / auto-login / sign-out use cases, the
//!   lifecycle controller, and the auth event stream
//! - **infra**: encrypted secret store, privileged and direct session
//!   bridges, REST identity provider
//! - **monitor**: dashboard inactivity watch

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod monitor;

pub use application::{AuthConfig, AuthController, AuthEvent, AuthState};
pub use domain::entity::{EmergencyAdminRecord, Identity};
pub use domain::gateway::{IdentityProvider, PersistenceMode, SessionBridge};
pub use error::{AuthError, AuthResult};
pub use infra::{
    DirectBridge, FallbackBridge, ProcessBridge, RemoteConfig, RestIdentityProvider, SecretStore,
    StdioTransport,
};
pub use monitor::{ActivitySignal, InactivityMonitor, MonitorConfig};
