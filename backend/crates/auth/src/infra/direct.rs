//! Direct Session Bridge
//!
//! Implements the session bridge without the elevated helper: directory
//! reads and writes go straight to the data backend's REST endpoint, the
//! last-user record lives in a plain JSON file next to the secret store,
//! and custom tokens are minted in-process with an HMAC signature.
//!
//! Functionally equivalent to the helper-backed bridge; used when the
//! console runs without elevation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::domain::entity::{AdminEntry, Identity};
use crate::domain::gateway::SessionBridge;
use crate::error::{AuthError, AuthResult};
use crate::infra::remote::RemoteConfig;

/// Last-user file name under the data directory
pub const LAST_USER_FILE: &str = "last-user.json";

/// Session bridge that skips the helper process entirely
pub struct DirectBridge {
    http: reqwest::Client,
    database_url: String,
    session_secret: [u8; 32],
    data_dir: PathBuf,
}

impl DirectBridge {
    pub fn new(config: &RemoteConfig, session_secret: [u8; 32], data_dir: PathBuf) -> Self {
        Self {
            http: reqwest::Client::new(),
            database_url: config.database_url.trim_end_matches('/').to_string(),
            session_secret,
            data_dir,
        }
    }

    fn last_user_path(&self) -> PathBuf {
        self.data_dir.join(LAST_USER_FILE)
    }

    /// Mint a signed `{uid}.{signature}` token
    fn mint_token(&self, uid: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.session_secret)
            .expect("HMAC can take key of any size");
        mac.update(uid.as_bytes());
        let signature = mac.finalize().into_bytes();
        format!("{}.{}", uid, URL_SAFE_NO_PAD.encode(signature))
    }
}

impl SessionBridge for DirectBridge {
    async fn fetch_admins(&self) -> AuthResult<HashMap<String, AdminEntry>> {
        let url = format!("{}/admins.json", self.database_url);
        let admins: Option<HashMap<String, AdminEntry>> = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(admins.unwrap_or_default())
    }

    async fn create_custom_token(&self, uid: &str) -> AuthResult<String> {
        Ok(self.mint_token(uid))
    }

    async fn save_last_user(&self, identity: &Identity) -> AuthResult<()> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| AuthError::Internal(format!("Data directory unavailable: {e}")))?;
        let body = serde_json::to_vec_pretty(&identity.without_token())
            .map_err(|e| AuthError::Internal(format!("Identity encoding failed: {e}")))?;
        fs::write(self.last_user_path(), body)
            .map_err(|e| AuthError::Internal(format!("Last-user write failed: {e}")))?;
        Ok(())
    }

    async fn get_last_user(&self) -> AuthResult<Option<Identity>> {
        let body = match fs::read(self.last_user_path()) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::Internal(format!("Last-user read failed: {e}"))),
        };
        match serde_json::from_slice(&body) {
            Ok(identity) => Ok(Some(identity)),
            Err(e) => {
                // Unreadable last-user only costs the silent login
                tracing::warn!(error = %e, "Discarding unreadable last-user record");
                Ok(None)
            }
        }
    }

    async fn clear_last_user(&self) -> AuthResult<()> {
        match fs::remove_file(self.last_user_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Internal(format!("Last-user clear failed: {e}"))),
        }
    }

    async fn update_admin_last_login(&self, uid: &str, at: DateTime<Utc>) -> AuthResult<()> {
        let url = format!("{}/admins/{}.json", self.database_url, uid);
        self.http
            .patch(&url)
            .json(&json!({ "lastLogin": at.to_rfc3339() }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
