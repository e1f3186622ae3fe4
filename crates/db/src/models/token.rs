//! Bearer token model.

use std::fmt;

use repforge_core::tokens;
use repforge_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `tokens` table.
///
/// Only the digest is stored; the plaintext secret is never persisted.
#[derive(Debug, Clone, FromRow)]
pub struct Token {
    pub hash: String,
    pub user_id: DbId,
    pub expiry: Timestamp,
    pub scope: String,
}

impl Token {
    /// A stored token is valid only strictly before its expiry.
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        tokens::is_unexpired(self.expiry, now)
    }
}

/// The result of issuing a token: the one-time plaintext plus its row.
pub struct IssuedToken {
    /// Plaintext secret to hand to the client. Unrecoverable afterwards.
    pub plaintext: String,
    pub token: Token,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("plaintext", &"<redacted>")
            .field("token", &self.token)
            .finish()
    }
}
