// ABOUTME: Database operations for exercises prescribed inside a workout (sets, reps, position)
// ABOUTME: Joins catalog data for reads and snapshots; position writes use the positions protocol
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use chrono::{DateTime, Utc};
use ironlog_core::dates::parse_timestamp;
use ironlog_core::errors::database::storage_error;
use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::PageRequest;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::exercises::{row_to_exercise_prefixed, Exercise};
use super::positions::{with_retry, TxResult, WORKOUT_EXERCISES};
use super::{now_timestamp, parse_uuid};

/// Columns of a workout-exercise joined with its catalog entry
const JOINED_COLUMNS: &str = r"
    we.id, we.workout_id, we.exercise_id, we.sets, we.reps, we.position,
    we.created_at, we.updated_at,
    e.id AS ex_id, e.name AS ex_name, e.primary_muscle AS ex_primary_muscle,
    e.secondary_muscles AS ex_secondary_muscles, e.equipment AS ex_equipment,
    e.description AS ex_description, e.created_at AS ex_created_at,
    e.updated_at AS ex_updated_at
";

/// A (sets, reps) prescription of a catalog exercise inside a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    /// Unique identifier
    pub id: Uuid,
    /// Parent workout
    pub workout_id: Uuid,
    /// Catalog entry
    pub exercise_id: Uuid,
    /// Prescribed sets, at least 1
    pub sets: i64,
    /// Prescribed reps per set, at least 1
    pub reps: i64,
    /// Dense 1-based position among the workout's live exercises
    pub position: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Catalog data, when the entry is still live
    pub exercise: Option<Exercise>,
}

/// Workout-exercise database operations manager
pub struct WorkoutExercisesManager {
    pool: SqlitePool,
}

impl WorkoutExercisesManager {
    /// Create a new workout-exercises manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Attach a catalog exercise as the last one of a workout
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the workout is gone, `CONFLICT` when
    /// concurrent writers exhaust the retries, or an error if database
    /// operation fails
    pub async fn append(
        &self,
        workout_id: Uuid,
        exercise_id: Uuid,
        sets: i64,
        reps: i64,
    ) -> AppResult<WorkoutExercise> {
        let parent = workout_id.to_string();
        let exercise = exercise_id.to_string();
        let id = with_retry("append workout exercise", || {
            self.append_attempt(&parent, &exercise, sets, reps)
        })
        .await?;
        debug!(workout_exercise_id = %id, workout_id = %workout_id, "Workout exercise appended");

        self.get(id)
            .await?
            .ok_or_else(|| AppError::internal("Workout exercise missing after insert"))
    }

    async fn append_attempt(
        &self,
        workout_id: &str,
        exercise_id: &str,
        sets: i64,
        reps: i64,
    ) -> TxResult<Uuid> {
        let now = now_timestamp();
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        WORKOUT_EXERCISES
            .lock_parent(&mut tx, workout_id, &now)
            .await?;
        let position = WORKOUT_EXERCISES.next_position(&mut tx, workout_id).await?;

        sqlx::query(
            r"
            INSERT INTO workout_exercises (
                id, workout_id, exercise_id, sets, reps, position, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(id.to_string())
        .bind(workout_id)
        .bind(exercise_id)
        .bind(sets)
        .bind(reps)
        .bind(position)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Get a live workout-exercise with its catalog entry
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<WorkoutExercise>> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS} FROM workout_exercises we \
             LEFT JOIN exercises e ON e.id = we.exercise_id AND e.deleted_at IS NULL \
             WHERE we.id = $1 AND we.deleted_at IS NULL"
        );
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("get workout exercise", &e))?;

        row.map(|r| row_to_workout_exercise(&r)).transpose()
    }

    /// List a workout's live exercises ordered by position, paginated
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_by_workout(
        &self,
        workout_id: Uuid,
        page: PageRequest,
    ) -> AppResult<(Vec<WorkoutExercise>, i64)> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS} FROM workout_exercises we \
             LEFT JOIN exercises e ON e.id = we.exercise_id AND e.deleted_at IS NULL \
             WHERE we.workout_id = $1 AND we.deleted_at IS NULL \
             ORDER BY we.position ASC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query(&sql)
            .bind(workout_id.to_string())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("list workout exercises", &e))?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM workout_exercises WHERE workout_id = $1 AND deleted_at IS NULL",
        )
        .bind(workout_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("count workout exercises", &e))?;

        let items = rows
            .iter()
            .map(row_to_workout_exercise)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    /// Every live exercise of a workout ordered by position
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_all_by_workout(&self, workout_id: Uuid) -> AppResult<Vec<WorkoutExercise>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_error("acquire connection", &e))?;
        Self::list_all_on(&mut conn, &workout_id.to_string())
            .await
            .map_err(|e| e.into_app_error("list workout exercises"))
    }

    /// Every live exercise of a workout, read on the given connection
    ///
    /// Session creation calls this inside its transaction so the snapshot sees
    /// the same state as the session insert.
    pub(crate) async fn list_all_on(
        conn: &mut SqliteConnection,
        workout_id: &str,
    ) -> TxResult<Vec<WorkoutExercise>> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS} FROM workout_exercises we \
             LEFT JOIN exercises e ON e.id = we.exercise_id AND e.deleted_at IS NULL \
             WHERE we.workout_id = $1 AND we.deleted_at IS NULL \
             ORDER BY we.position ASC"
        );
        let rows = sqlx::query(&sql).bind(workout_id).fetch_all(conn).await?;
        Ok(rows
            .iter()
            .map(row_to_workout_exercise)
            .collect::<AppResult<Vec<_>>>()?)
    }

    /// Change sets and/or reps
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn update(
        &self,
        id: Uuid,
        sets: Option<i64>,
        reps: Option<i64>,
    ) -> AppResult<Option<WorkoutExercise>> {
        let result = sqlx::query(
            r"
            UPDATE workout_exercises SET
                sets = COALESCE($1, sets),
                reps = COALESCE($2, reps),
                updated_at = $3
            WHERE id = $4 AND deleted_at IS NULL
            ",
        )
        .bind(sets)
        .bind(reps)
        .bind(now_timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("update workout exercise", &e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Soft-delete a workout-exercise and close the gap among its siblings
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when it is not a live child of the
    /// workout, `CONFLICT` on exhausted retries, or an error if database
    /// operation fails
    pub async fn remove(&self, workout_id: Uuid, id: Uuid) -> AppResult<()> {
        let parent = workout_id.to_string();
        let target = id.to_string();
        with_retry("remove workout exercise", || {
            self.remove_attempt(&parent, &target)
        })
        .await
    }

    async fn remove_attempt(&self, workout_id: &str, id: &str) -> TxResult<()> {
        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;
        WORKOUT_EXERCISES
            .lock_parent(&mut tx, workout_id, &now)
            .await?;
        WORKOUT_EXERCISES
            .remove(&mut tx, workout_id, id, &now)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Move a workout-exercise to `new_position` within its workout
    ///
    /// # Errors
    ///
    /// Returns `INVALID_REQUEST` when `new_position` is outside `1..=N`,
    /// `RESOURCE_NOT_FOUND` when it is not a live child of the workout,
    /// `CONFLICT` on exhausted retries, or an error if database operation
    /// fails
    pub async fn reorder(&self, workout_id: Uuid, id: Uuid, new_position: i64) -> AppResult<()> {
        let parent = workout_id.to_string();
        let target = id.to_string();
        with_retry("reorder workout exercise", || {
            self.reorder_attempt(&parent, &target, new_position)
        })
        .await
    }

    async fn reorder_attempt(&self, workout_id: &str, id: &str, new_position: i64) -> TxResult<()> {
        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;
        WORKOUT_EXERCISES
            .lock_parent(&mut tx, workout_id, &now)
            .await?;
        WORKOUT_EXERCISES
            .reorder(&mut tx, workout_id, id, new_position, &now)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

fn row_to_workout_exercise(row: &SqliteRow) -> AppResult<WorkoutExercise> {
    let id: String = row.get("id");
    let workout_id: String = row.get("workout_id");
    let exercise_id: String = row.get("exercise_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");
    let catalog_id: Option<String> = row.get("ex_id");

    let exercise = match catalog_id {
        Some(_) => Some(row_to_exercise_prefixed(row, "ex_")?),
        None => None,
    };

    Ok(WorkoutExercise {
        id: parse_uuid(&id)?,
        workout_id: parse_uuid(&workout_id)?,
        exercise_id: parse_uuid(&exercise_id)?,
        sets: row.get("sets"),
        reps: row.get("reps"),
        position: row.get("position"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        exercise,
    })
}
