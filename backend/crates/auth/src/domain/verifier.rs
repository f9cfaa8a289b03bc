//! Credential Verifier
//!
//! Pure verification of a username/password pair against a provisioned
//! emergency record. No I/O and no timing shortcuts: the hash comparison
//! is constant-time, and derivation always replays the parameters the
//! record was provisioned with.

use platform::{crypto, kdf};

use crate::domain::entity::EmergencyAdminRecord;

/// Verify a credential pair against an emergency record
///
/// The username match is exact and case-sensitive. Any mismatch, in the
/// username or in the derived hash, returns `false`; the caller cannot
/// tell which check failed.
pub fn verify(username: &str, password: &str, record: &EmergencyAdminRecord) -> bool {
    if username != record.username {
        return false;
    }

    let derived = kdf::hash_password(password, &record.password_salt, &record.kdf_params);
    crypto::constant_time_eq(&derived, &record.password_hash)
}
