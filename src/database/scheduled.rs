// ABOUTME: Database operations for scheduled workout occurrences on calendar dates
// ABOUTME: Date-range listing, next-upcoming lookup, partial update, and soft delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use chrono::{DateTime, NaiveDate, Utc};
use ironlog_core::dates::{format_date, parse_date, parse_timestamp};
use ironlog_core::errors::database::storage_error;
use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::PageRequest;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{now_timestamp, parse_uuid};

/// A planned occurrence of a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledWorkout {
    /// Unique identifier
    pub id: Uuid,
    /// Owning profile
    pub profile_id: Uuid,
    /// Workout to perform
    pub workout_id: Uuid,
    /// Planned calendar date
    pub date: NaiveDate,
    /// Free-form notes
    pub notes: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Scheduled workout database operations manager
pub struct ScheduledWorkoutsManager {
    pool: SqlitePool,
}

impl ScheduledWorkoutsManager {
    /// Create a new scheduled workouts manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a scheduled entry
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create(
        &self,
        profile_id: Uuid,
        workout_id: Uuid,
        date: NaiveDate,
        notes: &str,
    ) -> AppResult<ScheduledWorkout> {
        let id = Uuid::new_v4();
        let now = now_timestamp();

        sqlx::query(
            r"
            INSERT INTO scheduled_workouts (id, profile_id, workout_id, date, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ",
        )
        .bind(id.to_string())
        .bind(profile_id.to_string())
        .bind(workout_id.to_string())
        .bind(format_date(date))
        .bind(notes)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("create scheduled workout", &e))?;

        self.get(id)
            .await?
            .ok_or_else(|| AppError::internal("Scheduled workout missing after insert"))
    }

    /// Get a live entry by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<ScheduledWorkout>> {
        let row = sqlx::query(
            r"
            SELECT id, profile_id, workout_id, date, notes, created_at, updated_at
            FROM scheduled_workouts
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get scheduled workout", &e))?;

        row.map(|r| row_to_scheduled(&r)).transpose()
    }

    /// List a profile's entries with `start <= date <= end`, earliest first
    ///
    /// Either bound may be absent.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_by_profile(
        &self,
        profile_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        page: PageRequest,
    ) -> AppResult<(Vec<ScheduledWorkout>, i64)> {
        let start = start.map(format_date);
        let end = end.map(format_date);

        let rows = sqlx::query(
            r"
            SELECT id, profile_id, workout_id, date, notes, created_at, updated_at
            FROM scheduled_workouts
            WHERE profile_id = $1 AND deleted_at IS NULL
              AND ($2 IS NULL OR date >= $2)
              AND ($3 IS NULL OR date <= $3)
            ORDER BY date ASC, created_at ASC
            LIMIT $4 OFFSET $5
            ",
        )
        .bind(profile_id.to_string())
        .bind(&start)
        .bind(&end)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list scheduled workouts", &e))?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM scheduled_workouts
            WHERE profile_id = $1 AND deleted_at IS NULL
              AND ($2 IS NULL OR date >= $2)
              AND ($3 IS NULL OR date <= $3)
            ",
        )
        .bind(profile_id.to_string())
        .bind(&start)
        .bind(&end)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("count scheduled workouts", &e))?;

        let items = rows
            .iter()
            .map(row_to_scheduled)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    /// The entry with the smallest date on or after `today`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn next_upcoming(
        &self,
        profile_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<Option<ScheduledWorkout>> {
        let row = sqlx::query(
            r"
            SELECT id, profile_id, workout_id, date, notes, created_at, updated_at
            FROM scheduled_workouts
            WHERE profile_id = $1 AND deleted_at IS NULL AND date >= $2
            ORDER BY date ASC, created_at ASC
            LIMIT 1
            ",
        )
        .bind(profile_id.to_string())
        .bind(format_date(today))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get upcoming scheduled workout", &e))?;

        row.map(|r| row_to_scheduled(&r)).transpose()
    }

    /// Change date and/or notes
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn update(
        &self,
        id: Uuid,
        date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> AppResult<Option<ScheduledWorkout>> {
        let result = sqlx::query(
            r"
            UPDATE scheduled_workouts SET
                date = COALESCE($1, date),
                notes = COALESCE($2, notes),
                updated_at = $3
            WHERE id = $4 AND deleted_at IS NULL
            ",
        )
        .bind(date.map(format_date))
        .bind(notes)
        .bind(now_timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("update scheduled workout", &e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Soft-delete an entry; `false` when nothing live matched
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE scheduled_workouts SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(now_timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("delete scheduled workout", &e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_scheduled(row: &SqliteRow) -> AppResult<ScheduledWorkout> {
    let id: String = row.get("id");
    let profile_id: String = row.get("profile_id");
    let workout_id: String = row.get("workout_id");
    let date: String = row.get("date");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(ScheduledWorkout {
        id: parse_uuid(&id)?,
        profile_id: parse_uuid(&profile_id)?,
        workout_id: parse_uuid(&workout_id)?,
        date: parse_date("date", &date)
            .map_err(|_| AppError::internal(format!("Invalid stored date '{date}'")))?,
        notes: row.get("notes"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
