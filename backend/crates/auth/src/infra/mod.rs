//! Infrastructure Layer
//!
//! Concrete gateways: the encrypted secret store, the helper-backed and
//! direct session bridges, and the REST identity provider.

pub mod bridge;
pub mod direct;
pub mod remote;
pub mod secret_store;

pub use bridge::{FallbackBridge, ProcessBridge, StdioTransport};
pub use direct::DirectBridge;
pub use remote::{RemoteConfig, RestIdentityProvider};
pub use secret_store::SecretStore;
