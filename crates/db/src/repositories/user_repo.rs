//! Repository for the `users` table.

use repforge_core::tokens::{hash_token, scopes};
use repforge_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User};
use crate::repositories::TokenRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, password_digest, bio, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row with its generated id
    /// and timestamps.
    ///
    /// A duplicate username fails with a unique violation on
    /// `uq_users_username`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_digest, bio)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_digest)
            .bind(&input.bio)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the owner of a presented bearer secret.
    ///
    /// Only matches a token of the given `scope` whose expiry is after
    /// `now`, so a `Some` here is a complete authentication success.
    pub async fn find_by_token(
        pool: &PgPool,
        scope: &str,
        secret: &str,
        now: Timestamp,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = "SELECT u.id, u.username, u.email, u.password_digest, u.bio, \
                            u.created_at, u.updated_at
                     FROM users u
                     INNER JOIN tokens t ON t.user_id = u.id
                     WHERE t.hash = $1 AND t.scope = $2 AND t.expiry > $3";
        sqlx::query_as::<_, User>(query)
            .bind(hash_token(secret))
            .bind(scope)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// When `input.password_digest` is set, every authentication token of
    /// the user is revoked in the same transaction, so a new password never
    /// commits while old tokens stay valid.
    ///
    /// Returns `None` (with nothing written) if no row with the given `id`
    /// exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE users SET
                email = COALESCE($2, email),
                bio = COALESCE($3, bio),
                password_digest = COALESCE($4, password_digest),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(user) = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.bio)
            .bind(&input.password_digest)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if input.password_digest.is_some() {
            TokenRepo::revoke_all_inner(&mut *tx, user.id, scopes::AUTHENTICATION).await?;
        }

        tx.commit().await?;
        Ok(Some(user))
    }

    /// Replace a user's password digest and revoke their authentication
    /// tokens. Returns `true` if the user exists.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_digest: &str,
    ) -> Result<bool, sqlx::Error> {
        let input = UpdateUser {
            password_digest: Some(password_digest.to_string()),
            ..Default::default()
        };
        Ok(Self::update(pool, id, &input).await?.is_some())
    }
}
