// ABOUTME: Database operations for workout sessions and their frozen workout snapshots
// ABOUTME: Session row and snapshot are written in the same transaction; completion is monotonic
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use chrono::{DateTime, Utc};
use ironlog_core::dates::{format_timestamp, parse_timestamp};
use ironlog_core::errors::database::storage_error;
use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::PageRequest;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::positions::{with_retry, TxResult};
use super::workout_exercises::WorkoutExercisesManager;
use super::workouts::row_to_workout;
use super::{now_timestamp, parse_uuid};
use crate::snapshot::WorkoutSnapshot;

/// An execution of a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutSession {
    /// Unique identifier
    pub id: Uuid,
    /// Owning profile
    pub profile_id: Uuid,
    /// Workout the session was started from
    pub workout_id: Uuid,
    /// Stored snapshot document, never rewritten
    pub snapshot: String,
    /// Server clock at start
    pub started_at: DateTime<Utc>,
    /// Server clock at completion
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkoutSession {
    /// Decode the stored snapshot document
    ///
    /// # Errors
    ///
    /// Returns an internal error if the stored document is corrupt or carries
    /// an unknown schema version
    pub fn snapshot(&self) -> AppResult<WorkoutSnapshot> {
        WorkoutSnapshot::from_document(&self.snapshot)
    }
}

/// Session database operations manager
pub struct SessionsManager {
    pool: SqlitePool,
}

impl SessionsManager {
    /// Create a new sessions manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a session, freezing the workout and its exercises into the snapshot
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the workout is gone, `CONFLICT` when
    /// the write lock stays contended, or an error if database operation fails
    pub async fn start(&self, profile_id: Uuid, workout_id: Uuid) -> AppResult<WorkoutSession> {
        let profile = profile_id.to_string();
        let workout = workout_id.to_string();
        let id = with_retry("start workout session", || {
            self.start_attempt(&profile, &workout)
        })
        .await?;

        info!(session_id = %id, workout_id = %workout_id, "Workout session started");
        self.get(id)
            .await?
            .ok_or_else(|| AppError::internal("Workout session missing after insert"))
    }

    async fn start_attempt(&self, profile_id: &str, workout_id: &str) -> TxResult<Uuid> {
        let started_at = Utc::now();
        let now = format_timestamp(started_at);
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        // Write first so the read below cannot be invalidated by another
        // writer before the insert upgrades the transaction
        let claimed = sqlx::query(
            "UPDATE workouts SET updated_at = updated_at WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(workout_id)
        .execute(&mut *tx)
        .await?;
        if claimed.rows_affected() == 0 {
            return Err(AppError::not_found("Workout").into());
        }

        let workout_row = sqlx::query(
            r"
            SELECT id, training_program_id, name, position, created_at, updated_at
            FROM workouts
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(workout_id)
        .fetch_one(&mut *tx)
        .await?;

        let workout = row_to_workout(&workout_row)?;
        let exercises = WorkoutExercisesManager::list_all_on(&mut tx, workout_id).await?;
        let document = WorkoutSnapshot::capture(&workout, &exercises, started_at).to_document()?;

        sqlx::query(
            r"
            INSERT INTO workout_sessions (
                id, profile_id, workout_id, snapshot, started_at, completed_at,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, NULL, $5, $5)
            ",
        )
        .bind(id.to_string())
        .bind(profile_id)
        .bind(workout_id)
        .bind(&document)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    /// Get a live session by ID, regardless of owner
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<WorkoutSession>> {
        let row = sqlx::query(
            r"
            SELECT id, profile_id, workout_id, snapshot, started_at, completed_at
            FROM workout_sessions
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get workout session", &e))?;

        row.map(|r| row_to_session(&r)).transpose()
    }

    /// List a profile's sessions, most recently started first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_by_profile(
        &self,
        profile_id: Uuid,
        page: PageRequest,
    ) -> AppResult<(Vec<WorkoutSession>, i64)> {
        let rows = sqlx::query(
            r"
            SELECT id, profile_id, workout_id, snapshot, started_at, completed_at
            FROM workout_sessions
            WHERE profile_id = $1 AND deleted_at IS NULL
            ORDER BY started_at DESC, id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(profile_id.to_string())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list workout sessions", &e))?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM workout_sessions WHERE profile_id = $1 AND deleted_at IS NULL",
        )
        .bind(profile_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("count workout sessions", &e))?;

        let items = rows
            .iter()
            .map(row_to_session)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    /// Set `completed_at` if it is still unset and return the session
    ///
    /// A second call leaves the first completion time in place.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn complete(&self, id: Uuid) -> AppResult<Option<WorkoutSession>> {
        let now = now_timestamp();
        let result = sqlx::query(
            r"
            UPDATE workout_sessions SET completed_at = $1, updated_at = $1
            WHERE id = $2 AND completed_at IS NULL AND deleted_at IS NULL
            ",
        )
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("complete workout session", &e))?;

        if result.rows_affected() > 0 {
            info!(session_id = %id, "Workout session completed");
        }
        self.get(id).await
    }
}

fn row_to_session(row: &SqliteRow) -> AppResult<WorkoutSession> {
    let id: String = row.get("id");
    let profile_id: String = row.get("profile_id");
    let workout_id: String = row.get("workout_id");
    let started_at: String = row.get("started_at");
    let completed_at: Option<String> = row.get("completed_at");

    Ok(WorkoutSession {
        id: parse_uuid(&id)?,
        profile_id: parse_uuid(&profile_id)?,
        workout_id: parse_uuid(&workout_id)?,
        snapshot: row.get("snapshot"),
        started_at: parse_timestamp(&started_at)?,
        completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
    })
}
