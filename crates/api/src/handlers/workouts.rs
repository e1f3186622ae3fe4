//! Handlers for the `/workouts` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use repforge_core::error::CoreError;
use repforge_core::types::DbId;
use repforge_core::validation::validate_entries;
use repforge_db::models::workout::{CreateWorkout, CreateWorkoutEntry, UpdateWorkout};
use repforge_db::repositories::WorkoutRepo;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `PUT /workouts/{id}`.
///
/// Absent scalars keep their stored value. A present `entries` list
/// replaces every stored entry; an absent one re-writes the current list.
#[derive(Debug, Deserialize)]
pub struct PatchWorkoutRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub calories_burned: Option<i32>,
    pub entries: Option<Vec<CreateWorkoutEntry>>,
}

fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("title is required".into()));
    }
    Ok(())
}

fn validate_workout_entries(entries: &[CreateWorkoutEntry]) -> Result<(), CoreError> {
    validate_entries(entries.iter().map(|e| (e.sets, e.order_index)))
}

/// Confirm `id` exists and belongs to the caller.
async fn ensure_owner(state: &AppState, auth: &AuthUser, id: DbId) -> AppResult<()> {
    let owner_id = WorkoutRepo::get_owner_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workout", id))?;

    if owner_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this workout".into(),
        )));
    }
    Ok(())
}

/// GET /api/v1/workouts
pub async fn list_mine(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Value>> {
    let workouts = WorkoutRepo::list_by_owner(&state.pool, auth.user_id).await?;
    Ok(Json(json!({ "workouts": workouts })))
}

/// GET /api/v1/workouts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Value>> {
    let workout = WorkoutRepo::find_by_id_with_entries(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workout", id))?;
    Ok(Json(json!({ "workout": workout })))
}

/// POST /api/v1/workouts
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateWorkout>,
) -> AppResult<(StatusCode, Json<Value>)> {
    validate_title(&input.title)?;
    validate_workout_entries(&input.entries)?;

    let workout = WorkoutRepo::create(&state.pool, auth.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(json!({ "workout": workout }))))
}

/// PUT /api/v1/workouts/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<PatchWorkoutRequest>,
) -> AppResult<Json<Value>> {
    ensure_owner(&state, &auth, id).await?;

    let current = WorkoutRepo::find_by_id_with_entries(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::not_found("Workout", id))?;

    let mut next = UpdateWorkout::from(&current);
    if let Some(title) = input.title {
        next.title = title;
    }
    if let Some(description) = input.description {
        next.description = description;
    }
    if let Some(duration_minutes) = input.duration_minutes {
        next.duration_minutes = duration_minutes;
    }
    if let Some(calories_burned) = input.calories_burned {
        next.calories_burned = calories_burned;
    }
    if let Some(entries) = input.entries {
        next.entries = entries;
    }
    validate_title(&next.title)?;
    validate_workout_entries(&next.entries)?;

    let workout = WorkoutRepo::update(&state.pool, id, &next)
        .await?
        .ok_or_else(|| CoreError::not_found("Workout", id))?;
    Ok(Json(json!({ "workout": workout })))
}

/// DELETE /api/v1/workouts/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    ensure_owner(&state, &auth, id).await?;

    if WorkoutRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("Workout", id)))
    }
}
