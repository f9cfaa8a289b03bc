//! Application Layer
//!
//! Use cases and the lifecycle controller. Everything here is written
//! against the gateway traits; concrete transports are injected by the
//! apps.

pub mod auto_login;
pub mod config;
pub mod controller;
pub mod events;
pub mod sign_in;
pub mod sign_out;

#[cfg(test)]
pub(crate) mod test_support;

pub use auto_login::AutoLoginUseCase;
pub use config::AuthConfig;
pub use controller::{AuthController, AuthState};
pub use events::{AuthEvent, AuthEvents};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
