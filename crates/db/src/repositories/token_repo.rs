//! Repository for the `tokens` table.
//!
//! Secrets are digested with [`hash_token`] before they touch SQL, so the
//! plaintext never reaches the database or the logs.

use chrono::{Duration, Utc};
use repforge_core::tokens::{generate_token, hash_token};
use repforge_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::token::{IssuedToken, Token};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "hash, user_id, expiry, scope";

/// Issues, looks up and revokes bearer tokens.
pub struct TokenRepo;

impl TokenRepo {
    /// Insert an already-digested token row.
    pub async fn insert(pool: &PgPool, token: &Token) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO tokens (hash, user_id, expiry, scope) VALUES ($1, $2, $3, $4)")
            .bind(&token.hash)
            .bind(token.user_id)
            .bind(token.expiry)
            .bind(&token.scope)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Generate a secret for `user_id`, persist its digest with an expiry of
    /// now + `ttl`, and return the plaintext exactly once.
    pub async fn create_new_token(
        pool: &PgPool,
        user_id: DbId,
        ttl: Duration,
        scope: &str,
    ) -> Result<IssuedToken, sqlx::Error> {
        let generated = generate_token(Utc::now(), ttl);
        let token = Token {
            hash: generated.hash,
            user_id,
            expiry: generated.expiry,
            scope: scope.to_string(),
        };
        Self::insert(pool, &token).await?;

        tracing::info!(user_id, scope, expiry = %token.expiry, "Issued token");

        Ok(IssuedToken {
            plaintext: generated.plaintext,
            token,
        })
    }

    /// Look up a token by the digest of a presented secret.
    ///
    /// This does not check expiry or scope; use [`Self::authenticate`] to
    /// decide whether the secret grants access.
    pub async fn find_by_secret(pool: &PgPool, secret: &str) -> Result<Option<Token>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tokens WHERE hash = $1");
        sqlx::query_as::<_, Token>(&query)
            .bind(hash_token(secret))
            .fetch_optional(pool)
            .await
    }

    /// Return the token only if it exists, carries `scope`, and is
    /// unexpired at `now`.
    pub async fn authenticate(
        pool: &PgPool,
        secret: &str,
        scope: &str,
        now: Timestamp,
    ) -> Result<Option<Token>, sqlx::Error> {
        let token = Self::find_by_secret(pool, secret).await?;
        Ok(token.filter(|t| t.scope == scope && t.is_valid_at(now)))
    }

    /// Delete the single token matching a secret. Returns `true` if a row
    /// was deleted.
    pub async fn revoke(pool: &PgPool, secret: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tokens WHERE hash = $1")
            .bind(hash_token(secret))
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every token of `scope` held by `user_id`. Returns the count of
    /// revoked tokens.
    pub async fn revoke_all_for_user(
        pool: &PgPool,
        user_id: DbId,
        scope: &str,
    ) -> Result<u64, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::revoke_all_inner(&mut *conn, user_id, scope).await
    }

    /// Revoke on a caller-supplied connection, typically an open transaction.
    pub(crate) async fn revoke_all_inner(
        conn: &mut PgConnection,
        user_id: DbId,
        scope: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tokens WHERE user_id = $1 AND scope = $2")
            .bind(user_id)
            .bind(scope)
            .execute(conn)
            .await?;

        tracing::info!(user_id, scope, revoked = result.rows_affected(), "Revoked tokens");

        Ok(result.rows_affected())
    }

    /// Delete tokens that expired at or before `now`. Returns the count of
    /// deleted rows.
    pub async fn cleanup_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tokens WHERE expiry <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
