//! Route definitions for the `/workouts` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::workouts;
use crate::state::AppState;

/// Routes mounted at `/workouts`.
///
/// ```text
/// GET    /        -> list_mine (requires auth)
/// POST   /        -> create (requires auth)
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update (owner only)
/// DELETE /{id}    -> delete (owner only)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(workouts::list_mine).post(workouts::create))
        .route(
            "/{id}",
            get(workouts::get_by_id)
                .put(workouts::update)
                .delete(workouts::delete),
        )
}
