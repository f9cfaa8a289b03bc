//! Authenticated Encryption
//!
//! AES-256-GCM sealing for at-rest artifacts. A sealed envelope carries the
//! per-call nonce, the GCM authentication tag, and the ciphertext as three
//! separate fields so tampering with any of them fails decryption.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use thiserror::Error;

use crate::crypto::random_bytes;

/// Symmetric key length (AES-256)
pub const KEY_LEN: usize = 32;

/// Nonce length (96-bit, GCM standard)
pub const NONCE_LEN: usize = 12;

/// GCM authentication tag length
pub const TAG_LEN: usize = 16;

/// Encryption/decryption errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Key is not exactly [`KEY_LEN`] bytes
    #[error("Encryption key must be {KEY_LEN} bytes (got {0})")]
    MalformedKey(usize),

    /// Envelope fields have impossible lengths
    #[error("Sealed envelope is malformed")]
    MalformedEnvelope,

    /// Authentication tag did not verify (tampered data or wrong key)
    #[error("Authentication tag mismatch")]
    AuthTagMismatch,

    /// Cipher rejected the encryption request
    #[error("Encryption failed")]
    EncryptFailed,
}

/// Sealed envelope: `{iv, tag, data}` with raw bytes
///
/// Callers serialize this to whatever on-disk encoding they need (the
/// secret store writes each field base64-encoded in JSON).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    /// Per-call random nonce
    pub iv: Vec<u8>,
    /// GCM authentication tag
    pub tag: Vec<u8>,
    /// Ciphertext without the tag
    pub data: Vec<u8>,
}

/// Encrypt plaintext under the given 256-bit key
///
/// A fresh random 96-bit nonce is drawn for every call; sealing the same
/// plaintext twice never produces the same envelope.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<Sealed, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::MalformedKey(key.len()));
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));
    let iv = random_bytes(NONCE_LEN);

    let mut ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CryptoError::EncryptFailed)?;

    // aes-gcm appends the tag to the ciphertext; split it back out so the
    // envelope carries the three fields the on-disk format expects
    let tag = ciphertext.split_off(ciphertext.len() - TAG_LEN);

    Ok(Sealed {
        iv,
        tag,
        data: ciphertext,
    })
}

/// Decrypt a sealed envelope under the given key
///
/// Fails with [`CryptoError::AuthTagMismatch`] when the envelope was
/// tampered with or the key is wrong.
pub fn open(key: &[u8], sealed: &Sealed) -> Result<Vec<u8>, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::MalformedKey(key.len()));
    }
    if sealed.iv.len() != NONCE_LEN || sealed.tag.len() != TAG_LEN {
        return Err(CryptoError::MalformedEnvelope);
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let mut combined = Vec::with_capacity(sealed.data.len() + TAG_LEN);
    combined.extend_from_slice(&sealed.data);
    combined.extend_from_slice(&sealed.tag);

    cipher
        .decrypt(Nonce::from_slice(&sealed.iv), combined.as_slice())
        .map_err(|_| CryptoError::AuthTagMismatch)
}
