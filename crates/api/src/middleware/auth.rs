//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use repforge_core::error::CoreError;
use repforge_core::tokens::scopes;
use repforge_core::types::DbId;
use repforge_db::repositories::UserRepo;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user resolved from an opaque bearer token in the
/// `Authorization` header.
///
/// The token must exist with the `authentication` scope and be unexpired;
/// anything else is rejected with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's internal database id.
    pub user_id: DbId,
    pub username: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let user =
            UserRepo::find_by_token(&state.pool, scopes::AUTHENTICATION, token.trim(), Utc::now())
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
                })?;

        Ok(AuthUser {
            user_id: user.id,
            username: user.username,
        })
    }
}
