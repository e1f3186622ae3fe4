//! Workout aggregate: one `workouts` row plus its ordered `workout_entries`.

use repforge_core::types::DbId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `workouts` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Workout {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
}

/// A row from the `workout_entries` table.
///
/// `reps`, `weight` and `duration_seconds` are genuinely optional: a timed
/// exercise has no reps, and a recorded `0` is distinct from "not recorded".
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct WorkoutEntry {
    pub id: DbId,
    pub workout_id: DbId,
    pub exercise_name: String,
    pub sets: i32,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub duration_seconds: Option<i32>,
    pub notes: String,
    pub order_index: i32,
}

/// A workout together with its entries sorted by `order_index` ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutWithEntries {
    #[serde(flatten)]
    pub workout: Workout,
    pub entries: Vec<WorkoutEntry>,
}

/// DTO for one entry of a create or replace.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateWorkoutEntry {
    pub exercise_name: String,
    pub sets: i32,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub duration_seconds: Option<i32>,
    #[serde(default)]
    pub notes: String,
    pub order_index: i32,
}

impl From<&WorkoutEntry> for CreateWorkoutEntry {
    fn from(entry: &WorkoutEntry) -> Self {
        Self {
            exercise_name: entry.exercise_name.clone(),
            sets: entry.sets,
            reps: entry.reps,
            weight: entry.weight,
            duration_seconds: entry.duration_seconds,
            notes: entry.notes.clone(),
            order_index: entry.order_index,
        }
    }
}

/// DTO for creating a workout. The owner is supplied separately by the
/// caller from the authenticated identity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkout {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    #[serde(default)]
    pub entries: Vec<CreateWorkoutEntry>,
}

/// Full replacement state for an existing workout.
///
/// Every scalar is written and the entry list replaces the stored one
/// wholesale. Entry ids are therefore not stable across updates.
#[derive(Debug, Clone)]
pub struct UpdateWorkout {
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    pub entries: Vec<CreateWorkoutEntry>,
}

impl From<&WorkoutWithEntries> for UpdateWorkout {
    fn from(current: &WorkoutWithEntries) -> Self {
        Self {
            title: current.workout.title.clone(),
            description: current.workout.description.clone(),
            duration_minutes: current.workout.duration_minutes,
            calories_burned: current.workout.calories_burned,
            entries: current.entries.iter().map(CreateWorkoutEntry::from).collect(),
        }
    }
}
