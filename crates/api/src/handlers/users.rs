//! Handlers for the `/users` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use repforge_core::error::CoreError;
use repforge_core::password::hash_password;
use repforge_core::validation::{validate_email, validate_password, validate_username};
use repforge_db::models::user::{CreateUser, UpdateUser, UserResponse};
use repforge_db::repositories::UserRepo;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
    pub password: String,
}

/// Request body for `PUT /users/{username}`. Absent fields are unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub bio: Option<String>,
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterUserRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    validate_username(&input.username)?;
    validate_email(&input.email)?;
    validate_password(&input.password)?;

    let create = CreateUser::with_password(input.username, input.email, input.bio, &input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(&state.pool, &create).await.map_err(|e| {
        if repforge_db::is_unique_violation(&e) {
            AppError::Core(CoreError::Conflict("username is already taken".into()))
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": UserResponse::from(user) })),
    ))
}

/// GET /api/v1/users/{username}
pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<Value>> {
    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;
    Ok(Json(json!({ "user": UserResponse::from(user) })))
}

/// PUT /api/v1/users/{username}
///
/// Only the user themself may update their profile. Changing the password
/// revokes every outstanding authentication token, including the one used
/// for this request.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(username): Path<String>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<Value>> {
    let existing = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    if existing.id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You may only update your own profile".into(),
        )));
    }

    if let Some(ref email) = input.email {
        validate_email(email)?;
    }
    let password_digest = match input.password {
        Some(ref password) => {
            validate_password(password)?;
            Some(
                hash_password(password)
                    .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?,
            )
        }
        None => None,
    };
    let credentials_changed = password_digest.is_some();

    let update = UpdateUser {
        email: input.email,
        bio: input.bio,
        password_digest,
    };
    let user = UserRepo::update(&state.pool, existing.id, &update)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &username))?;

    if credentials_changed {
        tracing::info!(user_id = user.id, "Password changed; authentication tokens revoked");
    }

    Ok(Json(json!({ "user": UserResponse::from(user) })))
}
