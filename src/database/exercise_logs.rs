// ABOUTME: Database operations for per-set exercise logs recorded against workout sessions
// ABOUTME: Three paginated views, partial correction, soft delete, and the weight-per-day aggregate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use chrono::{DateTime, NaiveDate, Utc};
use ironlog_core::dates::{format_date, format_timestamp, parse_date, parse_timestamp};
use ironlog_core::errors::database::storage_error;
use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::PageRequest;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use super::{now_timestamp, parse_uuid};

/// Calendar day of a stored `logged_at` (timestamps are stored in UTC, date first)
const LOGGED_DAY: &str = "substr(logged_at, 1, 10)";

/// One executed set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLog {
    /// Unique identifier
    pub id: Uuid,
    /// Owning profile
    pub profile_id: Uuid,
    /// Session the set was performed in
    pub workout_session_id: Uuid,
    /// Catalog exercise performed
    pub exercise_id: Uuid,
    /// Set number, at least 1; duplicates allowed
    pub set_number: i64,
    /// Reps completed
    pub reps_completed: i64,
    /// Weight used per rep
    pub weight_used: f64,
    /// When the set was logged
    pub logged_at: DateTime<Utc>,
}

/// Fields of a new log
#[derive(Debug, Clone)]
pub struct NewExerciseLog {
    /// Owning profile
    pub profile_id: Uuid,
    /// Session
    pub workout_session_id: Uuid,
    /// Catalog exercise
    pub exercise_id: Uuid,
    /// Set number
    pub set_number: i64,
    /// Reps completed
    pub reps_completed: i64,
    /// Weight used
    pub weight_used: f64,
    /// Log time
    pub logged_at: DateTime<Utc>,
}

/// Partial correction of a log
#[derive(Debug, Clone, Default)]
pub struct ExerciseLogChanges {
    /// New set number
    pub set_number: Option<i64>,
    /// New reps
    pub reps_completed: Option<i64>,
    /// New weight
    pub weight_used: Option<f64>,
}

/// Total lifted weight on one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeight {
    /// Calendar day (UTC)
    pub date: NaiveDate,
    /// `Σ weight × reps` of that day's logs
    pub total_weight: f64,
}

/// Which logs a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFilter {
    /// All of the profile's logs
    All,
    /// Logs of one session
    Session(Uuid),
    /// Logs of one catalog exercise
    Exercise(Uuid),
}

impl LogFilter {
    /// Bound values for the session and exercise columns
    fn bounds(self) -> (Option<String>, Option<String>) {
        match self {
            Self::All => (None, None),
            Self::Session(id) => (Some(id.to_string()), None),
            Self::Exercise(id) => (None, Some(id.to_string())),
        }
    }
}

/// Exercise log database operations manager
pub struct ExerciseLogsManager {
    pool: SqlitePool,
}

impl ExerciseLogsManager {
    /// Create a new exercise logs manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a log
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create(&self, log: &NewExerciseLog) -> AppResult<ExerciseLog> {
        let id = Uuid::new_v4();
        let now = now_timestamp();

        sqlx::query(
            r"
            INSERT INTO exercise_logs (
                id, profile_id, workout_session_id, exercise_id, set_number,
                reps_completed, weight_used, logged_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            ",
        )
        .bind(id.to_string())
        .bind(log.profile_id.to_string())
        .bind(log.workout_session_id.to_string())
        .bind(log.exercise_id.to_string())
        .bind(log.set_number)
        .bind(log.reps_completed)
        .bind(log.weight_used)
        .bind(format_timestamp(log.logged_at))
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("create exercise log", &e))?;

        self.get(id)
            .await?
            .ok_or_else(|| AppError::internal("Exercise log missing after insert"))
    }

    /// Get a live log by ID, regardless of owner
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<ExerciseLog>> {
        let row = sqlx::query(
            r"
            SELECT id, profile_id, workout_session_id, exercise_id, set_number,
                   reps_completed, weight_used, logged_at
            FROM exercise_logs
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get exercise log", &e))?;

        row.map(|r| row_to_log(&r)).transpose()
    }

    /// List a profile's logs, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list(
        &self,
        profile_id: Uuid,
        filter: LogFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<ExerciseLog>, i64)> {
        let (session, exercise) = filter.bounds();

        let rows = sqlx::query(
            r"
            SELECT id, profile_id, workout_session_id, exercise_id, set_number,
                   reps_completed, weight_used, logged_at
            FROM exercise_logs
            WHERE profile_id = $1 AND deleted_at IS NULL
              AND ($2 IS NULL OR workout_session_id = $2)
              AND ($3 IS NULL OR exercise_id = $3)
            ORDER BY logged_at DESC, id DESC
            LIMIT $4 OFFSET $5
            ",
        )
        .bind(profile_id.to_string())
        .bind(&session)
        .bind(&exercise)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list exercise logs", &e))?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM exercise_logs
            WHERE profile_id = $1 AND deleted_at IS NULL
              AND ($2 IS NULL OR workout_session_id = $2)
              AND ($3 IS NULL OR exercise_id = $3)
            ",
        )
        .bind(profile_id.to_string())
        .bind(&session)
        .bind(&exercise)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("count exercise logs", &e))?;

        let items = rows.iter().map(row_to_log).collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    /// Apply a partial correction
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn update(
        &self,
        id: Uuid,
        changes: &ExerciseLogChanges,
    ) -> AppResult<Option<ExerciseLog>> {
        let result = sqlx::query(
            r"
            UPDATE exercise_logs SET
                set_number = COALESCE($1, set_number),
                reps_completed = COALESCE($2, reps_completed),
                weight_used = COALESCE($3, weight_used),
                updated_at = $4
            WHERE id = $5 AND deleted_at IS NULL
            ",
        )
        .bind(changes.set_number)
        .bind(changes.reps_completed)
        .bind(changes.weight_used)
        .bind(now_timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("update exercise log", &e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Soft-delete a log; `false` when nothing live matched
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE exercise_logs SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(now_timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("delete exercise log", &e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Sum `weight × reps` per calendar day for one profile and exercise
    ///
    /// Bounds are inclusive; either may be absent. Days without logs are omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn weight_per_day(
        &self,
        profile_id: Uuid,
        exercise_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<Vec<DailyWeight>> {
        let sql = format!(
            "SELECT {LOGGED_DAY} AS day, SUM(weight_used * reps_completed) AS total \
             FROM exercise_logs \
             WHERE profile_id = $1 AND exercise_id = $2 AND deleted_at IS NULL \
               AND ($3 IS NULL OR {LOGGED_DAY} >= $3) \
               AND ($4 IS NULL OR {LOGGED_DAY} <= $4) \
             GROUP BY day ORDER BY day ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(profile_id.to_string())
            .bind(exercise_id.to_string())
            .bind(start.map(format_date))
            .bind(end.map(format_date))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("aggregate weight per day", &e))?;

        rows.iter()
            .map(|row| {
                let day: String = row.get("day");
                Ok(DailyWeight {
                    date: parse_date("date", &day)
                        .map_err(|_| AppError::internal(format!("Invalid stored date '{day}'")))?,
                    total_weight: row.get("total"),
                })
            })
            .collect()
    }
}

fn row_to_log(row: &SqliteRow) -> AppResult<ExerciseLog> {
    let id: String = row.get("id");
    let profile_id: String = row.get("profile_id");
    let session_id: String = row.get("workout_session_id");
    let exercise_id: String = row.get("exercise_id");
    let logged_at: String = row.get("logged_at");

    Ok(ExerciseLog {
        id: parse_uuid(&id)?,
        profile_id: parse_uuid(&profile_id)?,
        workout_session_id: parse_uuid(&session_id)?,
        exercise_id: parse_uuid(&exercise_id)?,
        set_number: row.get("set_number"),
        reps_completed: row.get("reps_completed"),
        weight_used: row.get("weight_used"),
        logged_at: parse_timestamp(&logged_at)?,
    })
}
