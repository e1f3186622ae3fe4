pub mod health;
pub mod tokens;
pub mod users;
pub mod workouts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                       register (public)
/// /users/{username}            get (public), update (self only)
///
/// /tokens/authentication       login (public), logout (requires auth)
///
/// /workouts                    list own, create (requires auth)
/// /workouts/{id}               get (public), update, delete (owner only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/tokens", tokens::router())
        .nest("/workouts", workouts::router())
}
