//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (random bytes, Base64, constant-time compare)
//! - Password key derivation (PBKDF2-HMAC with recorded parameters)
//! - Authenticated encryption (AES-256-GCM sealed envelopes)

pub mod cipher;
pub mod crypto;
pub mod kdf;
