//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST /              -> register
/// GET  /{username}    -> get_by_username
/// PUT  /{username}    -> update (requires auth, self only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register))
        .route("/{username}", get(users::get_by_username).put(users::update))
}
