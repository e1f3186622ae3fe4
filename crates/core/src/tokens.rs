//! Opaque bearer-token secrets.
//!
//! A secret is a random alphanumeric string handed to the client exactly
//! once. Only its SHA-256 digest is persisted, so validating a presented
//! secret is a single equality lookup on the digest column rather than a
//! per-row verification.

use std::fmt;

use chrono::Duration;
use rand::Rng;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a generated secret in alphanumeric characters (~285 bits).
pub const SECRET_LENGTH: usize = 48;

/// Known token scope names.
pub mod scopes {
    /// Bearer tokens issued at login and accepted by authenticated routes.
    pub const AUTHENTICATION: &str = "authentication";
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// A freshly generated token.
pub struct GeneratedToken {
    /// The plaintext secret. Returned to the caller once, never stored.
    pub plaintext: String,
    /// SHA-256 hex digest of `plaintext`; the stored lookup key.
    pub hash: String,
    /// Absolute expiry: issue time plus the requested TTL.
    pub expiry: Timestamp,
}

impl fmt::Debug for GeneratedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedToken")
            .field("plaintext", &"<redacted>")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

/// Generate a new random secret expiring `ttl` after `issued_at`.
pub fn generate_token(issued_at: Timestamp, ttl: Duration) -> GeneratedToken {
    let plaintext: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect();

    let hash = hash_token(&plaintext);

    GeneratedToken {
        plaintext,
        hash,
        expiry: issued_at + ttl,
    }
}

/// Compute the digest under which a secret is stored and looked up.
pub fn hash_token(secret: &str) -> String {
    crate::hashing::sha256_hex(secret.as_bytes())
}

// ---------------------------------------------------------------------------
// Validity
// ---------------------------------------------------------------------------

/// A token found by digest is only valid strictly before its expiry.
pub fn is_unexpired(expiry: Timestamp, now: Timestamp) -> bool {
    now < expiry
}
