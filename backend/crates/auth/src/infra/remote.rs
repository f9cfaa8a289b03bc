//! Remote Identity Provider
//!
//! REST client for the hosted identity endpoint. Credential checks POST
//! to the `accounts:signInWithPassword` route; the provider session is
//! held in-process and torn down on sign-out.

use serde::Deserialize;
use serde_json::json;
use std::env;
use std::sync::Mutex;

use crate::domain::entity::Identity;
use crate::domain::gateway::{IdentityProvider, PersistenceMode};
use crate::error::{AuthError, AuthResult};

/// Environment variable carrying the endpoint API key
pub const ENV_API_KEY: &str = "SCHOOLDESK_API_KEY";
/// Environment variable carrying the identity endpoint base URL
pub const ENV_AUTH_URL: &str = "SCHOOLDESK_AUTH_URL";
/// Environment variable carrying the data backend base URL
pub const ENV_DATABASE_URL: &str = "SCHOOLDESK_DATABASE_URL";

/// Connection settings for the hosted backend
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API key appended to identity endpoint calls
    pub api_key: String,
    /// Identity endpoint base URL
    pub auth_url: String,
    /// Data backend base URL (administrator directory)
    pub database_url: String,
}

impl RemoteConfig {
    /// Load from the environment, naming the first missing variable
    pub fn from_env() -> AuthResult<Self> {
        Ok(Self {
            api_key: require(ENV_API_KEY)?,
            auth_url: require(ENV_AUTH_URL)?,
            database_url: require(ENV_DATABASE_URL)?,
        })
    }
}

fn require(name: &str) -> AuthResult<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthError::ConfigMissing(name.to_string()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Identity provider backed by the hosted REST endpoint
pub struct RestIdentityProvider {
    http: reqwest::Client,
    config: RemoteConfig,
    session: Mutex<Option<Identity>>,
    persistence: Mutex<PersistenceMode>,
}

impl RestIdentityProvider {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session: Mutex::new(None),
            persistence: Mutex::new(PersistenceMode::default()),
        }
    }

    /// Map an endpoint error code to the auth error taxonomy
    ///
    /// Codes may carry a suffix (`TOO_MANY_ATTEMPTS_TRY_LATER : ...`), so
    /// matching is by prefix.
    fn map_error_code(message: &str) -> AuthError {
        if message.starts_with("INVALID_LOGIN_CREDENTIALS")
            || message.starts_with("EMAIL_NOT_FOUND")
            || message.starts_with("INVALID_PASSWORD")
        {
            AuthError::InvalidCredentials
        } else if message.starts_with("TOO_MANY_ATTEMPTS_TRY_LATER") {
            AuthError::RateLimited
        } else if message.starts_with("USER_DISABLED") {
            AuthError::AccountDisabled
        } else {
            AuthError::Internal(format!("Identity endpoint error: {message}"))
        }
    }
}

impl IdentityProvider for RestIdentityProvider {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Identity> {
        let url = format!(
            "{}/v1/accounts:signInWithPassword?key={}",
            self.config.auth_url.trim_end_matches('/'),
            self.config.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let err = match response.json::<ErrorBody>().await {
                Ok(body) => Self::map_error_code(&body.error.message),
                Err(e) => AuthError::Network(format!("Unreadable endpoint error: {e}")),
            };
            return Err(err);
        }

        let body: SignInResponse = response.json().await?;
        let mut identity = Identity::new(body.local_id, body.email);
        identity.display_name = body.display_name;

        *self.session.lock().unwrap() = Some(identity.clone());
        tracing::debug!(uid = %identity.uid, "Provider session opened");
        Ok(identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        self.session.lock().unwrap().take();
        tracing::debug!("Provider session closed");
        Ok(())
    }

    async fn current_session(&self) -> AuthResult<Option<Identity>> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn set_persistence(&self, mode: PersistenceMode) -> AuthResult<()> {
        *self.persistence.lock().unwrap() = mode;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        assert!(matches!(
            RestIdentityProvider::map_error_code("INVALID_LOGIN_CREDENTIALS"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            RestIdentityProvider::map_error_code("EMAIL_NOT_FOUND"),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            RestIdentityProvider::map_error_code("TOO_MANY_ATTEMPTS_TRY_LATER : retry later"),
            AuthError::RateLimited
        ));
        assert!(matches!(
            RestIdentityProvider::map_error_code("USER_DISABLED"),
            AuthError::AccountDisabled
        ));
        assert!(matches!(
            RestIdentityProvider::map_error_code("SOMETHING_ELSE"),
            AuthError::Internal(_)
        ));
    }

    #[test]
    fn test_sign_in_response_shape() {
        let json = r#"{"localId":"u1","email":"a@example.com","displayName":"A","idToken":"x"}"#;
        let body: SignInResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.local_id, "u1");
        assert_eq!(body.display_name.as_deref(), Some("A"));
    }

    #[test]
    fn test_config_from_env_names_missing_variable() {
        // Serialized by env-var mutation being process-wide; use unique names
        // via direct call instead
        unsafe { env::remove_var(ENV_API_KEY) };
        let err = RemoteConfig::from_env().unwrap_err();
        assert!(matches!(err, AuthError::ConfigMissing(name) if name == ENV_API_KEY));
    }
}
