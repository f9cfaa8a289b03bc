//! Local Secret Store
//!
//! Encrypted at-rest storage for the emergency administrator record under
//! the per-user application data directory:
//!
//! - `backup-admin.key`  - base64 AES-256 key, created on first use
//! - `backup-admin.json` - sealed record, `{iv, tag, data}` base64 fields
//!
//! Writes go through a temp file and rename so a crash never leaves a
//! half-written record. All operations are small synchronous file I/O.

use directories::ProjectDirs;
use platform::cipher::{self, KEY_LEN, Sealed};
use platform::crypto;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::entity::EmergencyAdminRecord;
use crate::error::{AuthError, AuthResult};

/// Key file name under the data directory
pub const KEY_FILE: &str = "backup-admin.key";

/// Sealed record file name under the data directory
pub const RECORD_FILE: &str = "backup-admin.json";

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "schooldesk";
const APPLICATION: &str = "schooldesk-console";

/// On-disk shape of the sealed record file
#[derive(Debug, Serialize, Deserialize)]
struct SealedFile {
    iv: String,
    tag: String,
    data: String,
}

/// Encrypted store for the machine-local emergency credential
#[derive(Debug, Clone)]
pub struct SecretStore {
    dir: PathBuf,
}

impl SecretStore {
    /// Open the store at the platform-standard application data directory
    pub fn open_default() -> AuthResult<Self> {
        let dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or_else(|| {
            AuthError::Internal("Could not resolve the application data directory".to_string())
        })?;
        Ok(Self::at(dirs.data_dir().to_path_buf()))
    }

    /// Open the store at an explicit directory (tests, provisioning CLI)
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory this store reads and writes under
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the sealed record file
    pub fn record_path(&self) -> PathBuf {
        self.dir.join(RECORD_FILE)
    }

    /// Load the encryption key, generating and persisting one on first use
    ///
    /// Idempotent: once a key exists it is returned unchanged forever;
    /// rotating it would orphan any sealed record.
    pub fn ensure_key(&self) -> AuthResult<[u8; KEY_LEN]> {
        let path = self.dir.join(KEY_FILE);

        match fs::read_to_string(&path) {
            Ok(encoded) => {
                let bytes = crypto::from_base64(encoded.trim())
                    .map_err(|_| AuthError::LocalStoreCorrupt)?;
                bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| AuthError::LocalStoreCorrupt)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir).map_err(internal_io)?;
                let key: [u8; KEY_LEN] = crypto::random_bytes(KEY_LEN)
                    .as_slice()
                    .try_into()
                    .map_err(|_| AuthError::Internal("Key generation failed".to_string()))?;
                write_atomic(&path, crypto::to_base64(&key).as_bytes())?;
                restrict_permissions(&path)?;
                tracing::info!(path = %path.display(), "Generated local secret store key");
                Ok(key)
            }
            Err(e) => Err(internal_io(e)),
        }
    }

    /// Seal and persist the emergency record, replacing any previous one
    pub fn write_record(&self, record: &EmergencyAdminRecord) -> AuthResult<()> {
        let key = self.ensure_key()?;

        let plaintext = serde_json::to_vec(record)
            .map_err(|e| AuthError::Internal(format!("Record serialization failed: {e}")))?;
        let sealed = cipher::seal(&key, &plaintext)?;

        let file = SealedFile {
            iv: crypto::to_base64(&sealed.iv),
            tag: crypto::to_base64(&sealed.tag),
            data: crypto::to_base64(&sealed.data),
        };
        let body = serde_json::to_vec_pretty(&file)
            .map_err(|e| AuthError::Internal(format!("Envelope serialization failed: {e}")))?;

        let path = self.record_path();
        write_atomic(&path, &body)?;
        restrict_permissions(&path)?;
        tracing::info!(username = %record.username, "Emergency admin record written");
        Ok(())
    }

    /// Load and unseal the emergency record
    ///
    /// A missing file is `Ok(None)`; any decoding or decryption failure is
    /// [`AuthError::LocalStoreCorrupt`].
    pub fn read_record(&self) -> AuthResult<Option<EmergencyAdminRecord>> {
        let path = self.record_path();
        let body = match fs::read(&path) {
            Ok(body) => body,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(internal_io(e)),
        };

        let file: SealedFile =
            serde_json::from_slice(&body).map_err(|_| AuthError::LocalStoreCorrupt)?;
        let sealed = Sealed {
            iv: crypto::from_base64(&file.iv).map_err(|_| AuthError::LocalStoreCorrupt)?,
            tag: crypto::from_base64(&file.tag).map_err(|_| AuthError::LocalStoreCorrupt)?,
            data: crypto::from_base64(&file.data).map_err(|_| AuthError::LocalStoreCorrupt)?,
        };

        let key = self.ensure_key()?;
        let plaintext = cipher::open(&key, &sealed)?;

        let record = serde_json::from_slice(&plaintext).map_err(|_| AuthError::LocalStoreCorrupt)?;
        Ok(Some(record))
    }

    /// Remove the sealed record; removing an absent record is not an error
    pub fn delete_record(&self) -> AuthResult<()> {
        match fs::remove_file(self.record_path()) {
            Ok(()) => {
                tracing::info!("Emergency admin record removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(internal_io(e)),
        }
    }
}

fn internal_io(e: io::Error) -> AuthError {
    AuthError::Internal(format!("Secret store I/O error: {e}"))
}

/// Write via temp file + rename in the same directory
fn write_atomic(path: &Path, body: &[u8]) -> AuthResult<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, body).map_err(internal_io)?;
    fs::rename(&tmp, path).map_err(internal_io)?;
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> AuthResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(internal_io)
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> AuthResult<()> {
    Ok(())
}
