//! Repository for the `workouts` and `workout_entries` tables.
//!
//! A workout and its entries are one aggregate: every write touches both
//! tables inside a single transaction, and entries are never exposed or
//! modified on their own.

use repforge_core::types::DbId;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::models::workout::{
    CreateWorkout, CreateWorkoutEntry, UpdateWorkout, Workout, WorkoutEntry, WorkoutWithEntries,
};

/// Column list for the `workouts` table.
const COLUMNS: &str = "id, owner_id, title, description, duration_minutes, calories_burned";

/// Column list for the `workout_entries` table.
const ENTRY_COLUMNS: &str = "id, workout_id, exercise_name, sets, reps, weight, \
    duration_seconds, notes, order_index";

/// Provides aggregate CRUD for workouts.
pub struct WorkoutRepo;

impl WorkoutRepo {
    /// Insert a workout owned by `owner_id` together with all of its entries.
    ///
    /// If any entry insert fails the whole transaction is rolled back and no
    /// workout row survives.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateWorkout,
    ) -> Result<WorkoutWithEntries, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO workouts (owner_id, title, description, duration_minutes, calories_burned) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let workout = sqlx::query_as::<_, Workout>(&insert_query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.duration_minutes)
            .bind(input.calories_burned)
            .fetch_one(&mut *tx)
            .await?;

        let entries = Self::insert_entries_inner(&mut tx, workout.id, &input.entries).await?;

        tx.commit().await?;

        tracing::debug!(
            workout_id = workout.id,
            owner_id,
            entry_count = entries.len(),
            "Created workout",
        );

        Ok(WorkoutWithEntries { workout, entries })
    }

    /// Find a workout row by ID, without entries.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workout>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workouts WHERE id = $1");
        sqlx::query_as::<_, Workout>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a workout by ID with its entries in ascending `order_index`.
    ///
    /// Both reads share one `REPEATABLE READ` snapshot, so a concurrent
    /// update is seen either entirely or not at all.
    /// Returns `None` if the workout does not exist.
    pub async fn find_by_id_with_entries(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WorkoutWithEntries>, sqlx::Error> {
        let mut tx = Self::begin_snapshot(pool).await?;

        let query = format!("SELECT {COLUMNS} FROM workouts WHERE id = $1");
        let Some(workout) = sqlx::query_as::<_, Workout>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        let entries = Self::get_entries_inner(&mut *tx, workout.id).await?;

        tx.commit().await?;
        Ok(Some(WorkoutWithEntries { workout, entries }))
    }

    /// List every workout owned by `owner_id`, newest first, with entries.
    ///
    /// Reads from a single snapshot like [`Self::find_by_id_with_entries`].
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<WorkoutWithEntries>, sqlx::Error> {
        let mut tx = Self::begin_snapshot(pool).await?;

        let query = format!("SELECT {COLUMNS} FROM workouts WHERE owner_id = $1 ORDER BY id DESC");
        let workouts = sqlx::query_as::<_, Workout>(&query)
            .bind(owner_id)
            .fetch_all(&mut *tx)
            .await?;

        let mut result = Vec::with_capacity(workouts.len());
        for workout in workouts {
            let entries = Self::get_entries_inner(&mut *tx, workout.id).await?;
            result.push(WorkoutWithEntries { workout, entries });
        }

        tx.commit().await?;
        Ok(result)
    }

    /// Look up only the owner of a workout, for access checks.
    pub async fn get_owner_id(pool: &PgPool, id: DbId) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>("SELECT owner_id FROM workouts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite a workout's scalar fields and replace its entire entry set.
    ///
    /// Existing entries are deleted and `input.entries` re-inserted, so entry
    /// ids change on every update. Concurrent updates are last-writer-wins.
    /// Returns `None` (with nothing written) if the workout does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorkout,
    ) -> Result<Option<WorkoutWithEntries>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let update_query = format!(
            "UPDATE workouts SET \
                title = $2, \
                description = $3, \
                duration_minutes = $4, \
                calories_burned = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let Some(workout) = sqlx::query_as::<_, Workout>(&update_query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.duration_minutes)
            .bind(input.calories_burned)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM workout_entries WHERE workout_id = $1")
            .bind(workout.id)
            .execute(&mut *tx)
            .await?;

        let entries = Self::insert_entries_inner(&mut tx, workout.id, &input.entries).await?;

        tx.commit().await?;
        Ok(Some(WorkoutWithEntries { workout, entries }))
    }

    /// Delete a workout. Its entries go with it via `ON DELETE CASCADE`.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Entry helpers
    // -----------------------------------------------------------------------

    /// Entries of one workout in ascending `order_index`.
    pub async fn get_entries(
        pool: &PgPool,
        workout_id: DbId,
    ) -> Result<Vec<WorkoutEntry>, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::get_entries_inner(&mut *conn, workout_id).await
    }

    async fn get_entries_inner(
        conn: &mut PgConnection,
        workout_id: DbId,
    ) -> Result<Vec<WorkoutEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM workout_entries \
             WHERE workout_id = $1 \
             ORDER BY order_index ASC"
        );
        sqlx::query_as::<_, WorkoutEntry>(&query)
            .bind(workout_id)
            .fetch_all(conn)
            .await
    }

    /// Open a read transaction whose statements all see the same snapshot.
    async fn begin_snapshot(pool: &PgPool) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }

    /// Insert entries in input order within an open transaction, returning
    /// them sorted by `order_index`.
    async fn insert_entries_inner(
        tx: &mut Transaction<'_, Postgres>,
        workout_id: DbId,
        entries: &[CreateWorkoutEntry],
    ) -> Result<Vec<WorkoutEntry>, sqlx::Error> {
        let insert_query = format!(
            "INSERT INTO workout_entries \
                (workout_id, exercise_name, sets, reps, weight, duration_seconds, notes, order_index) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ENTRY_COLUMNS}"
        );

        let mut inserted = Vec::with_capacity(entries.len());
        for entry in entries {
            let row = sqlx::query_as::<_, WorkoutEntry>(&insert_query)
                .bind(workout_id)
                .bind(&entry.exercise_name)
                .bind(entry.sets)
                .bind(entry.reps)
                .bind(entry.weight)
                .bind(entry.duration_seconds)
                .bind(&entry.notes)
                .bind(entry.order_index)
                .fetch_one(&mut **tx)
                .await?;
            inserted.push(row);
        }

        inserted.sort_by_key(|e| e.order_index);
        Ok(inserted)
    }
}
