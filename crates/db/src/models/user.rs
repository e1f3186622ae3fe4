//! User entity model and DTOs.

use repforge_core::password::{self, PasswordError};
use repforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password digest -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub bio: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Check a plaintext password against this user's stored digest.
    ///
    /// `Ok(false)` is a wrong password; `Err` means the stored digest itself
    /// is unusable.
    pub fn password_matches(&self, plaintext: &str) -> Result<bool, PasswordError> {
        password::verify_password(plaintext, &self.password_digest)
    }
}

/// Safe user representation for API responses (no password digest).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub bio: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            bio: user.bio,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for creating a new user.
#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_digest: String,
    pub bio: String,
}

impl CreateUser {
    /// Build an insert DTO, hashing `password` on the way in.
    ///
    /// The plaintext is not retained.
    pub fn with_password(
        username: impl Into<String>,
        email: impl Into<String>,
        bio: impl Into<String>,
        password: &str,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            username: username.into(),
            email: email.into(),
            password_digest: password::hash_password(password)?,
            bio: bio.into(),
        })
    }
}

/// DTO for updating an existing user. `None` fields are left unchanged.
///
/// Setting `password_digest` is a credential change: the repository revokes
/// every authentication token of the user in the same transaction.
#[derive(Debug, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub bio: Option<String>,
    pub password_digest: Option<String>,
}
