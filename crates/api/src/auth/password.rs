//! Argon2id hashing and verification.
//!
//! One capability, two use sites: account passwords and emailed one-time
//! codes are hashed and checked identically. Hashes use the Argon2id variant
//! with a cryptographically random salt and are stored as PHC strings, so
//! algorithm parameters and salt travel with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use gatehouse_core::error::CoreError;

/// Hash a secret (password or OTP code) with Argon2id and a random salt.
pub fn hash_secret(secret: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default(); // Argon2id with default params
    let hash = argon2
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| CoreError::Internal(format!("hashing failed: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a secret against a stored PHC-formatted Argon2id hash.
///
/// Returns `Ok(false)` on mismatch; the comparison time does not depend on
/// where the mismatch occurs.
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool, CoreError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| CoreError::Internal(format!("bad stored hash: {e}")))?;
    match Argon2::default().verify_password(secret.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CoreError::Internal(format!("verification failed: {e}"))),
    }
}
