//! Handlers for the `/tokens` resource (login and logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use repforge_core::error::CoreError;
use repforge_core::password;
use repforge_core::tokens::scopes;
use repforge_db::repositories::{TokenRepo, UserRepo};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /tokens/authentication`.
#[derive(Debug, Deserialize)]
pub struct CreateTokenRequest {
    pub username: String,
    pub password: String,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid username or password".into(),
    ))
}

/// POST /api/v1/tokens/authentication
///
/// Exchange username + password for a bearer token. The plaintext token is
/// only ever returned here.
pub async fn create_authentication_token(
    State(state): State<AppState>,
    Json(input): Json<CreateTokenRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let Some(user) = UserRepo::find_by_username(&state.pool, &input.username).await? else {
        // Unknown usernames pay the same Argon2 cost as known ones.
        password::verify_against_dummy(&input.password);
        return Err(invalid_credentials());
    };

    match user.password_matches(&input.password) {
        Ok(true) => {}
        Ok(false) => return Err(invalid_credentials()),
        Err(e) => {
            // Corrupt stored digest: reported to the client like a bad
            // password, but logged as a server fault.
            tracing::error!(user_id = user.id, error = %e, "Password verification failed");
            return Err(invalid_credentials());
        }
    }

    let issued = TokenRepo::create_new_token(
        &state.pool,
        user.id,
        state.config.auth_token_ttl(),
        scopes::AUTHENTICATION,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": {
                "token": issued.plaintext,
                "expiry": issued.token.expiry,
            }
        })),
    ))
}

/// DELETE /api/v1/tokens/authentication
///
/// Revoke every authentication token held by the caller. Returns 204.
pub async fn revoke_authentication_tokens(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<StatusCode> {
    TokenRepo::revoke_all_for_user(&state.pool, auth.user_id, scopes::AUTHENTICATION).await?;
    Ok(StatusCode::NO_CONTENT)
}
