// ABOUTME: Database operations for workouts ordered by position within a training program
// ABOUTME: Append, remove, and reorder run as retried transactions over the positions protocol
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use chrono::{DateTime, Utc};
use ironlog_core::dates::parse_timestamp;
use ironlog_core::errors::database::storage_error;
use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::PageRequest;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::positions::{with_retry, TxResult, WORKOUTS};
use super::{now_timestamp, parse_uuid};

/// Ordered template of workout-exercises inside a program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    /// Unique identifier
    pub id: Uuid,
    /// Parent program
    pub training_program_id: Uuid,
    /// Display name
    pub name: String,
    /// Dense 1-based position among the program's live workouts
    pub position: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Workout database operations manager
pub struct WorkoutsManager {
    pool: SqlitePool,
}

impl WorkoutsManager {
    /// Create a new workouts manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a workout as the last one of its program
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the program is gone, `CONFLICT` when
    /// concurrent writers exhaust the retries, or an error if database
    /// operation fails
    pub async fn append(&self, program_id: Uuid, name: &str) -> AppResult<Workout> {
        let parent = program_id.to_string();
        let id = with_retry("append workout", || self.append_attempt(&parent, name)).await?;
        debug!(workout_id = %id, program_id = %program_id, "Workout appended");

        self.get(id)
            .await?
            .ok_or_else(|| AppError::internal("Workout missing after insert"))
    }

    async fn append_attempt(&self, program_id: &str, name: &str) -> TxResult<Uuid> {
        let now = now_timestamp();
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        WORKOUTS.lock_parent(&mut tx, program_id, &now).await?;
        let position = WORKOUTS.next_position(&mut tx, program_id).await?;

        sqlx::query(
            r"
            INSERT INTO workouts (id, training_program_id, name, position, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(id.to_string())
        .bind(program_id)
        .bind(name)
        .bind(position)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Get a live workout by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Workout>> {
        let row = sqlx::query(
            r"
            SELECT id, training_program_id, name, position, created_at, updated_at
            FROM workouts
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get workout", &e))?;

        row.map(|r| row_to_workout(&r)).transpose()
    }

    /// List a program's live workouts ordered by position
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_by_program(
        &self,
        program_id: Uuid,
        page: PageRequest,
    ) -> AppResult<(Vec<Workout>, i64)> {
        let rows = sqlx::query(
            r"
            SELECT id, training_program_id, name, position, created_at, updated_at
            FROM workouts
            WHERE training_program_id = $1 AND deleted_at IS NULL
            ORDER BY position ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(program_id.to_string())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list workouts", &e))?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM workouts WHERE training_program_id = $1 AND deleted_at IS NULL",
        )
        .bind(program_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("count workouts", &e))?;

        let items = rows
            .iter()
            .map(row_to_workout)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    /// Rename a workout
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn rename(&self, id: Uuid, name: &str) -> AppResult<Option<Workout>> {
        let result = sqlx::query(
            "UPDATE workouts SET name = $1, updated_at = $2 WHERE id = $3 AND deleted_at IS NULL",
        )
        .bind(name)
        .bind(now_timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("update workout", &e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Soft-delete a workout and close the gap among its siblings
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the workout is not a live child of
    /// the program, `CONFLICT` on exhausted retries, or an error if database
    /// operation fails
    pub async fn remove(&self, program_id: Uuid, id: Uuid) -> AppResult<()> {
        let parent = program_id.to_string();
        let target = id.to_string();
        with_retry("remove workout", || self.remove_attempt(&parent, &target)).await
    }

    async fn remove_attempt(&self, program_id: &str, id: &str) -> TxResult<()> {
        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;
        WORKOUTS.lock_parent(&mut tx, program_id, &now).await?;
        WORKOUTS.remove(&mut tx, program_id, id, &now).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Move a workout to `new_position` within its program
    ///
    /// # Errors
    ///
    /// Returns `INVALID_REQUEST` when `new_position` is outside `1..=N`,
    /// `RESOURCE_NOT_FOUND` when the workout is not a live child of the
    /// program, `CONFLICT` on exhausted retries, or an error if database
    /// operation fails
    pub async fn reorder(&self, program_id: Uuid, id: Uuid, new_position: i64) -> AppResult<()> {
        let parent = program_id.to_string();
        let target = id.to_string();
        with_retry("reorder workout", || {
            self.reorder_attempt(&parent, &target, new_position)
        })
        .await
    }

    async fn reorder_attempt(&self, program_id: &str, id: &str, new_position: i64) -> TxResult<()> {
        let now = now_timestamp();
        let mut tx = self.pool.begin().await?;
        WORKOUTS.lock_parent(&mut tx, program_id, &now).await?;
        WORKOUTS
            .reorder(&mut tx, program_id, id, new_position, &now)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

pub(super) fn row_to_workout(row: &SqliteRow) -> AppResult<Workout> {
    let id: String = row.get("id");
    let program_id: String = row.get("training_program_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Workout {
        id: parse_uuid(&id)?,
        training_program_id: parse_uuid(&program_id)?,
        name: row.get("name"),
        position: row.get("position"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
