//! Emergency Administrator Record Entity
//!
//! The single offline credential provisioned on a machine. This struct is
//! what gets serialized to JSON and sealed inside the encrypted record
//! file; binary fields are stored base64-encoded so the plaintext stays
//! a plain JSON document.

use chrono::{DateTime, Utc};
use platform::kdf::{self, KdfError, KdfParams, SALT_LEN};
use serde::{Deserialize, Serialize};

/// Provisioned emergency credential with its derivation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyAdminRecord {
    /// Exact username the fallback matches against (case-sensitive)
    pub username: String,
    /// Random per-record salt
    #[serde(with = "b64")]
    pub password_salt: Vec<u8>,
    /// Derived password hash
    #[serde(with = "b64")]
    pub password_hash: Vec<u8>,
    /// Parameters the hash was derived with; verification always replays
    /// these, never the current defaults
    pub kdf_params: KdfParams,
    /// Provisioning timestamp
    pub created_at: DateTime<Utc>,
}

impl EmergencyAdminRecord {
    /// Provision a new record from a plaintext password
    ///
    /// Validates the parameters, draws a fresh salt, and derives the hash.
    pub fn provision(
        username: impl Into<String>,
        password: &str,
        params: KdfParams,
    ) -> Result<Self, KdfError> {
        params.validate()?;
        let salt = platform::crypto::random_bytes(SALT_LEN);
        let hash = kdf::hash_password(password, &salt, &params);
        Ok(Self {
            username: username.into(),
            password_salt: salt,
            password_hash: hash,
            kdf_params: params,
            created_at: Utc::now(),
        })
    }
}

mod b64 {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&platform::crypto::to_base64(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        platform::crypto::from_base64(&encoded).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::kdf::KdfDigest;

    fn fast_params() -> KdfParams {
        KdfParams {
            iterations: 10_000,
            output_length: 32,
            digest: KdfDigest::Sha256,
        }
    }

    #[test]
    fn test_provision_records_parameters() {
        let record =
            EmergencyAdminRecord::provision("admin@local", "secret123", fast_params()).unwrap();
        assert_eq!(record.username, "admin@local");
        assert_eq!(record.password_salt.len(), SALT_LEN);
        assert_eq!(record.password_hash.len(), 32);
        assert_eq!(record.kdf_params, fast_params());
    }

    #[test]
    fn test_provision_rejects_weak_parameters() {
        let weak = KdfParams {
            iterations: 100,
            ..fast_params()
        };
        assert!(EmergencyAdminRecord::provision("a", "b", weak).is_err());
    }

    #[test]
    fn test_fresh_salt_per_record() {
        let a = EmergencyAdminRecord::provision("a", "pw", fast_params()).unwrap();
        let b = EmergencyAdminRecord::provision("a", "pw", fast_params()).unwrap();
        assert_ne!(a.password_salt, b.password_salt);
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn test_serde_roundtrip_with_base64_fields() {
        let record =
            EmergencyAdminRecord::provision("admin@local", "secret123", fast_params()).unwrap();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"passwordSalt\""));
        assert!(json.contains("\"kdfParams\""));
        // Binary fields must be strings, not number arrays
        assert!(!json.contains("\"passwordHash\":["));
        let back: EmergencyAdminRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
