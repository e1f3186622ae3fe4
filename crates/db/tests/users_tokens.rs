//! Integration tests for the user and token repositories.
//!
//! Covers:
//! - Registration round trip with password verification
//! - Duplicate usernames and not-found lookups
//! - Token issuance, validity window, scope checks, and revocation

use chrono::{Duration, Utc};
use repforge_core::tokens::{hash_token, scopes};
use repforge_db::models::user::{CreateUser, UpdateUser};
use repforge_db::repositories::{TokenRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, username: &str, password: &str) -> i64 {
    let input = CreateUser::with_password(
        username,
        format!("{username}@example.com"),
        "",
        password,
    )
    .expect("hashing should succeed");
    UserRepo::create(pool, &input).await.unwrap().id
}

// ---------------------------------------------------------------------------
// Test: users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_registered_user_verifies_password(pool: PgPool) {
    let input = CreateUser::with_password("alice", "alice@example.com", "lifts", "Abcd123!")
        .unwrap();
    assert_ne!(input.password_digest, "Abcd123!");

    let created = UserRepo::create(&pool, &input).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.created_at, created.updated_at);

    let user = UserRepo::find_by_username(&pool, "alice")
        .await
        .unwrap()
        .expect("alice should exist");
    assert_eq!(user.id, created.id);
    assert_eq!(user.bio, "lifts");
    assert!(user.password_matches("Abcd123!").unwrap());
    assert!(!user.password_matches("wrong").unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_username_is_none(pool: PgPool) {
    let user = UserRepo::find_by_username(&pool, "nobody").await.unwrap();
    assert!(user.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_username_is_unique_violation(pool: PgPool) {
    create_user(&pool, "dup", "Abcd123!").await;

    let again = CreateUser::with_password("dup", "other@example.com", "", "Abcd123!").unwrap();
    let err = UserRepo::create(&pool, &again).await.unwrap_err();
    assert!(repforge_db::is_unique_violation(&err), "unexpected error: {err}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_applies_only_given_fields(pool: PgPool) {
    let id = create_user(&pool, "bob", "Abcd123!").await;

    let update = UpdateUser {
        bio: Some("new bio".to_string()),
        ..Default::default()
    };
    let user = UserRepo::update(&pool, id, &update).await.unwrap().unwrap();
    assert_eq!(user.bio, "new bio");
    assert_eq!(user.email, "bob@example.com");
    assert!(user.updated_at >= user.created_at);

    let missing = UserRepo::update(&pool, id + 1000, &update).await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_password_replaces_digest(pool: PgPool) {
    let id = create_user(&pool, "carol", "Abcd123!").await;
    let digest = repforge_core::password::hash_password("Efgh456?").unwrap();

    assert!(UserRepo::update_password(&pool, id, &digest).await.unwrap());
    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(user.password_matches("Efgh456?").unwrap());
    assert!(!user.password_matches("Abcd123!").unwrap());

    assert!(!UserRepo::update_password(&pool, id + 1000, &digest).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_credential_change_revokes_tokens_with_profile_update(pool: PgPool) {
    let id = create_user(&pool, "kate", "Abcd123!").await;
    let ttl = Duration::hours(1);
    let auth1 = TokenRepo::create_new_token(&pool, id, ttl, scopes::AUTHENTICATION).await.unwrap();
    let auth2 = TokenRepo::create_new_token(&pool, id, ttl, scopes::AUTHENTICATION).await.unwrap();
    let reset = TokenRepo::create_new_token(&pool, id, ttl, "password-reset").await.unwrap();

    let update = UpdateUser {
        email: Some("kate@new.example.com".to_string()),
        password_digest: Some(repforge_core::password::hash_password("Efgh456?").unwrap()),
        ..Default::default()
    };
    let user = UserRepo::update(&pool, id, &update).await.unwrap().unwrap();
    assert_eq!(user.email, "kate@new.example.com");
    assert!(user.password_matches("Efgh456?").unwrap());

    let now = Utc::now();
    for revoked in [&auth1, &auth2] {
        assert!(UserRepo::find_by_token(&pool, scopes::AUTHENTICATION, &revoked.plaintext, now)
            .await
            .unwrap()
            .is_none());
    }
    assert!(TokenRepo::authenticate(&pool, &reset.plaintext, "password-reset", now)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_only_update_keeps_tokens(pool: PgPool) {
    let id = create_user(&pool, "liam", "Abcd123!").await;
    let issued = TokenRepo::create_new_token(&pool, id, Duration::hours(1), scopes::AUTHENTICATION)
        .await
        .unwrap();

    let update = UpdateUser {
        bio: Some("rows".to_string()),
        ..Default::default()
    };
    UserRepo::update(&pool, id, &update).await.unwrap().unwrap();

    assert!(TokenRepo::authenticate(&pool, &issued.plaintext, scopes::AUTHENTICATION, Utc::now())
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_credential_change_for_missing_user_writes_nothing(pool: PgPool) {
    let id = create_user(&pool, "mona", "Abcd123!").await;
    let issued = TokenRepo::create_new_token(&pool, id, Duration::hours(1), scopes::AUTHENTICATION)
        .await
        .unwrap();

    let digest = repforge_core::password::hash_password("Efgh456?").unwrap();
    assert!(!UserRepo::update_password(&pool, id + 1000, &digest).await.unwrap());

    let user = UserRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert!(user.password_matches("Abcd123!").unwrap());
    assert!(TokenRepo::authenticate(&pool, &issued.plaintext, scopes::AUTHENTICATION, Utc::now())
        .await
        .unwrap()
        .is_some());
}

// ---------------------------------------------------------------------------
// Test: tokens
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_stores_only_digest(pool: PgPool) {
    let user_id = create_user(&pool, "dave", "Abcd123!").await;
    let issued = TokenRepo::create_new_token(&pool, user_id, Duration::hours(1), scopes::AUTHENTICATION)
        .await
        .unwrap();

    let stored: Vec<(String,)> = sqlx::query_as("SELECT hash FROM tokens")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].0, hash_token(&issued.plaintext));
    assert_ne!(stored[0].0, issued.plaintext);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_validity_window(pool: PgPool) {
    let user_id = create_user(&pool, "erin", "Abcd123!").await;
    let issued = TokenRepo::create_new_token(&pool, user_id, Duration::hours(1), scopes::AUTHENTICATION)
        .await
        .unwrap();

    let now = Utc::now();
    let valid = TokenRepo::authenticate(&pool, &issued.plaintext, scopes::AUTHENTICATION, now)
        .await
        .unwrap()
        .expect("fresh token should be valid");
    assert_eq!(valid.user_id, user_id);
    assert_eq!(valid.scope, scopes::AUTHENTICATION);

    let later = now + Duration::minutes(61);
    let expired = TokenRepo::authenticate(&pool, &issued.plaintext, scopes::AUTHENTICATION, later)
        .await
        .unwrap();
    assert!(expired.is_none());

    // The pure lookup still finds the expired row.
    let raw = TokenRepo::find_by_secret(&pool, &issued.plaintext)
        .await
        .unwrap()
        .expect("row should still exist");
    assert!(!raw.is_valid_at(later));

    let user = UserRepo::find_by_token(&pool, scopes::AUTHENTICATION, &issued.plaintext, now)
        .await
        .unwrap()
        .expect("token should resolve to its owner");
    assert_eq!(user.id, user_id);
    assert!(UserRepo::find_by_token(&pool, scopes::AUTHENTICATION, &issued.plaintext, later)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_rejected_for_other_scope_or_unknown_secret(pool: PgPool) {
    let user_id = create_user(&pool, "frank", "Abcd123!").await;
    let issued = TokenRepo::create_new_token(&pool, user_id, Duration::hours(1), "password-reset")
        .await
        .unwrap();
    let now = Utc::now();

    assert!(TokenRepo::authenticate(&pool, &issued.plaintext, scopes::AUTHENTICATION, now)
        .await
        .unwrap()
        .is_none());
    assert!(TokenRepo::authenticate(&pool, "made-up-secret", "password-reset", now)
        .await
        .unwrap()
        .is_none());
    assert!(TokenRepo::find_by_secret(&pool, "made-up-secret")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoked_token_is_never_valid(pool: PgPool) {
    let user_id = create_user(&pool, "gina", "Abcd123!").await;
    let issued = TokenRepo::create_new_token(&pool, user_id, Duration::hours(1), scopes::AUTHENTICATION)
        .await
        .unwrap();

    assert!(TokenRepo::revoke(&pool, &issued.plaintext).await.unwrap());
    assert!(TokenRepo::authenticate(&pool, &issued.plaintext, scopes::AUTHENTICATION, Utc::now())
        .await
        .unwrap()
        .is_none());
    assert!(!TokenRepo::revoke(&pool, &issued.plaintext).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_revoke_all_is_scoped_to_user_and_scope(pool: PgPool) {
    let henry = create_user(&pool, "henry", "Abcd123!").await;
    let iris = create_user(&pool, "iris", "Abcd123!").await;
    let ttl = Duration::hours(1);

    let h1 = TokenRepo::create_new_token(&pool, henry, ttl, scopes::AUTHENTICATION).await.unwrap();
    let h2 = TokenRepo::create_new_token(&pool, henry, ttl, scopes::AUTHENTICATION).await.unwrap();
    let h_other = TokenRepo::create_new_token(&pool, henry, ttl, "password-reset").await.unwrap();
    let i1 = TokenRepo::create_new_token(&pool, iris, ttl, scopes::AUTHENTICATION).await.unwrap();

    let revoked = TokenRepo::revoke_all_for_user(&pool, henry, scopes::AUTHENTICATION)
        .await
        .unwrap();
    assert_eq!(revoked, 2);

    let now = Utc::now();
    for gone in [&h1, &h2] {
        assert!(TokenRepo::authenticate(&pool, &gone.plaintext, scopes::AUTHENTICATION, now)
            .await
            .unwrap()
            .is_none());
    }
    assert!(TokenRepo::authenticate(&pool, &h_other.plaintext, "password-reset", now)
        .await
        .unwrap()
        .is_some());
    assert!(TokenRepo::authenticate(&pool, &i1.plaintext, scopes::AUTHENTICATION, now)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cleanup_expired_removes_only_expired(pool: PgPool) {
    let user_id = create_user(&pool, "jack", "Abcd123!").await;
    let short = TokenRepo::create_new_token(&pool, user_id, Duration::minutes(5), scopes::AUTHENTICATION)
        .await
        .unwrap();
    let long = TokenRepo::create_new_token(&pool, user_id, Duration::hours(2), scopes::AUTHENTICATION)
        .await
        .unwrap();

    let deleted = TokenRepo::cleanup_expired(&pool, Utc::now() + Duration::minutes(30))
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    assert!(TokenRepo::find_by_secret(&pool, &short.plaintext).await.unwrap().is_none());
    assert!(TokenRepo::find_by_secret(&pool, &long.plaintext).await.unwrap().is_some());
}
