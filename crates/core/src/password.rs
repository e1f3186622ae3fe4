//! Argon2id password hashing and verification.
//!
//! Every digest is produced with the same Argon2id parameters and a fresh
//! random salt from [`OsRng`]. Digests are stored in PHC string format, so
//! the algorithm, parameters and salt travel with the hash itself.
//!
//! A wrong password is a normal outcome (`Ok(false)`). Only a stored digest
//! that cannot be parsed, or a hasher failure, is reported as an error, so
//! callers can log corrupted credentials separately from failed logins.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

/// Failure while computing or checking a password digest.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("Stored password digest is malformed: {0}")]
    MalformedDigest(argon2::password_hash::Error),

    #[error("Password verification failed: {0}")]
    Verify(argon2::password_hash::Error),
}

/// The fixed work factor used for every new digest.
fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Returns the PHC-formatted digest string. The plaintext is only borrowed
/// for the duration of the call.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted digest.
///
/// Returns `Ok(true)` on a match and `Ok(false)` on a mismatch.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest).map_err(PasswordError::MalformedDigest)?;
    // Verification reads the parameters from the digest, not from `hasher()`.
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Verify(e)),
    }
}

/// Digest of a fixed throwaway password, computed on first use.
static DUMMY_DIGEST: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("repforge-unknown-account").ok());

/// Run a full verification against a throwaway digest and report no match.
///
/// Used when the account does not exist, so a failed login costs the same
/// Argon2 work whether or not the username is known.
pub fn verify_against_dummy(password: &str) -> bool {
    if let Some(digest) = DUMMY_DIGEST.as_deref() {
        let _ = verify_password(password, digest);
    }
    false
}
