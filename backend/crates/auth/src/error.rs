//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::cipher::CryptoError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong username or password (remote rejection or failed local fallback)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Remote endpoint throttled the attempt
    #[error("Too many attempts, try again later")]
    RateLimited,

    /// Signed in but not present in the administrator directory
    #[error("Not authorized as an administrator")]
    AccessDenied,

    /// Administrator entry exists but is disabled
    #[error("Administrator account is disabled")]
    AccountDisabled,

    /// Another sign-in attempt is already running
    #[error("Sign-in already in progress")]
    SignInInFlight,

    /// Transport-level failure reaching the remote endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Required remote configuration value is absent
    #[error("Missing configuration: {0}")]
    ConfigMissing(String),

    /// Local credential store failed decryption or decoding
    #[error("Local credential store is corrupt")]
    LocalStoreCorrupt,

    /// Privileged bridge process could not be reached
    #[error("Privileged bridge unavailable: {0}")]
    BridgeUnavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials => ErrorKind::Unauthorized,
            AuthError::RateLimited => ErrorKind::RateLimited,
            AuthError::AccessDenied | AuthError::AccountDisabled => ErrorKind::Forbidden,
            AuthError::SignInInFlight => ErrorKind::InvalidInput,
            AuthError::Network(_) => ErrorKind::Network,
            AuthError::ConfigMissing(_) => ErrorKind::ConfigMissing,
            AuthError::LocalStoreCorrupt => ErrorKind::Corrupt,
            AuthError::BridgeUnavailable(_) => ErrorKind::Unavailable,
            AuthError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Message suitable for direct display in the login form
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => "Incorrect username or password.".to_string(),
            AuthError::RateLimited => {
                "Too many failed attempts. Please wait a moment and try again.".to_string()
            }
            AuthError::AccessDenied => {
                "This account is not registered as an administrator.".to_string()
            }
            AuthError::AccountDisabled => {
                "This administrator account has been disabled.".to_string()
            }
            AuthError::SignInInFlight => "A sign-in attempt is already running.".to_string(),
            AuthError::Network(_) => {
                "Could not reach the sign-in service. Check the network connection.".to_string()
            }
            AuthError::ConfigMissing(name) => {
                format!("The application is not configured ({name} is missing).")
            }
            AuthError::LocalStoreCorrupt => {
                "The local emergency credential could not be read.".to_string()
            }
            AuthError::BridgeUnavailable(_) | AuthError::Internal(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::LocalStoreCorrupt => {
                tracing::error!("Local credential store failed integrity check");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RateLimited => {
                tracing::warn!("Login attempt rate limited by remote endpoint");
            }
            AuthError::BridgeUnavailable(reason) => {
                tracing::warn!(reason = %reason, "Privileged bridge unavailable");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::Unauthorized => AuthError::InvalidCredentials,
            ErrorKind::Forbidden => AuthError::AccessDenied,
            ErrorKind::RateLimited => AuthError::RateLimited,
            ErrorKind::Network => AuthError::Network(err.message().to_string()),
            ErrorKind::ConfigMissing => AuthError::ConfigMissing(err.message().to_string()),
            ErrorKind::Corrupt => AuthError::LocalStoreCorrupt,
            ErrorKind::Unavailable => AuthError::BridgeUnavailable(err.message().to_string()),
            _ => AuthError::Internal(err.message().to_string()),
        }
    }
}

impl From<CryptoError> for AuthError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::AuthTagMismatch
            | CryptoError::MalformedEnvelope
            | CryptoError::MalformedKey(_) => AuthError::LocalStoreCorrupt,
            CryptoError::EncryptFailed => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AppError::from(err).into()
    }
}
