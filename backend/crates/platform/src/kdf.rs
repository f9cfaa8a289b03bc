//! Password Key Derivation
//!
//! PBKDF2-HMAC derivation for the emergency-admin credential with:
//! - Parameters recorded next to every hash, so verification stays stable
//!   when defaults change later
//! - Unicode NFKC normalization before hashing
//! - Zeroization of intermediate password buffers
//!
//! The provisioning CLI and the login fallback both derive through this
//! module; the two must agree byte-for-byte on the output.

use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

/// Salt length in bytes (fixed, one random salt per record)
pub const SALT_LEN: usize = 16;

/// Lowest iteration count accepted when provisioning
pub const MIN_ITERATIONS: u32 = 10_000;

/// Default iteration count (OWASP guidance for PBKDF2-HMAC-SHA512)
pub const DEFAULT_ITERATIONS: u32 = 210_000;

/// Default derived-key length in bytes
pub const DEFAULT_OUTPUT_LENGTH: usize = 64;

/// KDF parameter errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KdfError {
    /// Iteration count below the provisioning floor
    #[error("Iteration count must be at least {min} (got {actual})")]
    IterationsTooLow { min: u32, actual: u32 },

    /// Derived-key length outside the supported range
    #[error("Output length must be between 16 and 128 bytes (got {0})")]
    OutputLengthInvalid(usize),

    /// Unknown digest code in a stored record
    #[error("Unknown digest algorithm: {0}")]
    UnknownDigest(String),
}

/// Digest algorithm driving the PBKDF2 HMAC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfDigest {
    /// HMAC-SHA-256
    Sha256,
    /// HMAC-SHA-512 (default)
    #[default]
    Sha512,
}

impl KdfDigest {
    /// Get string code for serialization
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Create from string code
    pub fn from_code(code: &str) -> Result<Self, KdfError> {
        match code {
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(KdfError::UnknownDigest(other.to_string())),
        }
    }
}

impl fmt::Display for KdfDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Recorded derivation parameters
///
/// Stored alongside every password hash. Verification always uses the
/// recorded parameters, never the current defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    /// PBKDF2 iteration count
    pub iterations: u32,
    /// Derived-key length in bytes
    pub output_length: usize,
    /// HMAC digest algorithm
    pub digest: KdfDigest,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            output_length: DEFAULT_OUTPUT_LENGTH,
            digest: KdfDigest::default(),
        }
    }
}

impl KdfParams {
    /// Validate parameters before provisioning a new record
    ///
    /// Records already on disk are verified with whatever parameters they
    /// carry; this floor only applies when creating new hashes.
    pub fn validate(&self) -> Result<(), KdfError> {
        if self.iterations < MIN_ITERATIONS {
            return Err(KdfError::IterationsTooLow {
                min: MIN_ITERATIONS,
                actual: self.iterations,
            });
        }
        if self.output_length < 16 || self.output_length > 128 {
            return Err(KdfError::OutputLengthInvalid(self.output_length));
        }
        Ok(())
    }
}

/// Derive a password hash with the given salt and parameters
///
/// Deterministic: identical inputs always produce identical output, which
/// is what verification relies on. The password is NFKC-normalized before
/// hashing so visually identical Unicode input verifies consistently.
pub fn hash_password(password: &str, salt: &[u8], params: &KdfParams) -> Vec<u8> {
    let normalized = Zeroizing::new(password.nfkc().collect::<String>());
    let mut output = vec![0u8; params.output_length];

    match params.digest {
        KdfDigest::Sha256 => {
            pbkdf2_hmac::<Sha256>(normalized.as_bytes(), salt, params.iterations, &mut output);
        }
        KdfDigest::Sha512 => {
            pbkdf2_hmac::<Sha512>(normalized.as_bytes(), salt, params.iterations, &mut output);
        }
    }

    output
}
