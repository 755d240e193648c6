// ABOUTME: Database operations for the shared exercise catalog
// ABOUTME: Read-mostly entries with JSON-encoded secondary muscle lists
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
use uuid::Uuid;

use super::{now_timestamp, parse_uuid};

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Main muscle group worked
    pub primary_muscle: String,
    /// Supporting muscle groups
    pub secondary_muscles: Vec<String>,
    /// Equipment needed
    pub equipment: String,
    /// Free-form description
    pub description: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// New catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExercise {
    /// Display name
    pub name: String,
    /// Main muscle group worked
    pub primary_muscle: String,
    /// Supporting muscle groups
    #[serde(default)]
    pub secondary_muscles: Vec<String>,
    /// Equipment needed
    #[serde(default)]
    pub equipment: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
}

/// Exercise catalog database operations manager
pub struct ExercisesManager {
    pool: SqlitePool,
}

impl ExercisesManager {
    /// Create a new exercises manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a catalog entry
    ///
    /// # Errors
    ///
    /// Returns `INVALID_REQUEST` for a blank name or primary muscle, or an
    /// error if database operation fails
    pub async fn create(&self, new: &NewExercise) -> AppResult<Exercise> {
        let name = new.name.trim();
        let primary_muscle = new.primary_muscle.trim();
        if name.is_empty() || primary_muscle.is_empty() {
            return Err(AppError::invalid_request(
                "Exercise name and primaryMuscle must not be empty",
            ));
        }

        let id = Uuid::new_v4();
        let now = now_timestamp();
        let secondary = serde_json::to_string(&new.secondary_muscles)?;

        sqlx::query(
            r"
            INSERT INTO exercises (
                id, name, primary_muscle, secondary_muscles, equipment, description,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(id.to_string())
        .bind(name)
        .bind(primary_muscle)
        .bind(&secondary)
        .bind(new.equipment.trim())
        .bind(new.description.trim())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("create exercise", &e))?;

        self.get(id)
            .await?
            .ok_or_else(|| AppError::internal("Exercise missing after insert"))
    }

    /// Get a catalog entry by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Exercise>> {
        let row = sqlx::query(
            r"
            SELECT id, name, primary_muscle, secondary_muscles, equipment, description,
                   created_at, updated_at
            FROM exercises
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get exercise", &e))?;

        row.map(|r| row_to_exercise(&r)).transpose()
    }

    /// Whether a live catalog entry exists
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let row = sqlx::query("SELECT 1 FROM exercises WHERE id = $1 AND deleted_at IS NULL")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("check exercise", &e))?;
        Ok(row.is_some())
    }

    /// List catalog entries ordered by name, optionally by primary muscle (case-insensitive)
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list(
        &self,
        primary_muscle: Option<&str>,
        page: PageRequest,
    ) -> AppResult<(Vec<Exercise>, i64)> {
        let rows = sqlx::query(
            r"
            SELECT id, name, primary_muscle, secondary_muscles, equipment, description,
                   created_at, updated_at
            FROM exercises
            WHERE deleted_at IS NULL
              AND ($1 IS NULL OR primary_muscle = $1 COLLATE NOCASE)
            ORDER BY name ASC, id ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(primary_muscle)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list exercises", &e))?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM exercises
            WHERE deleted_at IS NULL
              AND ($1 IS NULL OR primary_muscle = $1 COLLATE NOCASE)
            ",
        )
        .bind(primary_muscle)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("count exercises", &e))?;

        let items = rows
            .iter()
            .map(row_to_exercise)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    /// Number of live catalog entries
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM exercises WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("count exercises", &e))
    }
}

/// Convert a row carrying the catalog columns
///
/// Shared with the workout-exercise manager, whose joins alias the catalog
/// columns with an `ex_` prefix.
pub(crate) fn row_to_exercise_prefixed(row: &SqliteRow, prefix: &str) -> AppResult<Exercise> {
    let col = |name: &str| format!("{prefix}{name}");
    let id: String = row.get(col("id").as_str());
    let secondary: String = row.get(col("secondary_muscles").as_str());
    let created_at: String = row.get(col("created_at").as_str());
    let updated_at: String = row.get(col("updated_at").as_str());

    Ok(Exercise {
        id: parse_uuid(&id)?,
        name: row.get(col("name").as_str()),
        primary_muscle: row.get(col("primary_muscle").as_str()),
        secondary_muscles: serde_json::from_str(&secondary)?,
        equipment: row.get(col("equipment").as_str()),
        description: row.get(col("description").as_str()),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn row_to_exercise(row: &SqliteRow) -> AppResult<Exercise> {
    row_to_exercise_prefixed(row, "")
}
