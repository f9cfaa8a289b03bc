//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use crate::domain::gateway::PersistenceMode;
use crate::monitor::MonitorConfig;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for HMAC-signing custom tokens on the direct path (32 bytes)
    pub session_secret: [u8; 32],
    /// Pause between a successful silent login and revealing the dashboard
    pub reveal_delay: Duration,
    /// How the identity provider persists its session
    pub persistence: PersistenceMode,
    /// Inactivity timing
    pub monitor: MonitorConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: [0u8; 32],
            reveal_delay: Duration::from_millis(3500),
            persistence: PersistenceMode::Local,
            monitor: MonitorConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (no reveal delay)
    pub fn development() -> Self {
        Self {
            reveal_delay: Duration::ZERO,
            ..Self::with_random_secret()
        }
    }
}
