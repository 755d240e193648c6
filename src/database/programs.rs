// ABOUTME: Database operations for training programs owned by a profile
// ABOUTME: Metadata-only CRUD with soft delete; ownership checks live in authorization
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

/// Named collection of workouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingProgram {
    /// Unique identifier
    pub id: Uuid,
    /// Owning profile
    pub profile_id: Uuid,
    /// Display name, never empty
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Partial program update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateProgramRequest {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
}

/// Training program database operations manager
pub struct ProgramsManager {
    pool: SqlitePool,
}

impl ProgramsManager {
    /// Create a new programs manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a program for `profile_id`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn create(
        &self,
        profile_id: Uuid,
        name: &str,
        description: &str,
    ) -> AppResult<TrainingProgram> {
        let id = Uuid::new_v4();
        let now = now_timestamp();

        sqlx::query(
            r"
            INSERT INTO training_programs (id, profile_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(id.to_string())
        .bind(profile_id.to_string())
        .bind(name)
        .bind(description)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("create training program", &e))?;

        self.get(id)
            .await?
            .ok_or_else(|| AppError::internal("Training program missing after insert"))
    }

    /// Get a live program by ID, regardless of owner
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<TrainingProgram>> {
        let row = sqlx::query(
            r"
            SELECT id, profile_id, name, description, created_at, updated_at
            FROM training_programs
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get training program", &e))?;

        row.map(|r| row_to_program(&r)).transpose()
    }

    /// List a profile's programs, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_by_profile(
        &self,
        profile_id: Uuid,
        page: PageRequest,
    ) -> AppResult<(Vec<TrainingProgram>, i64)> {
        let rows = sqlx::query(
            r"
            SELECT id, profile_id, name, description, created_at, updated_at
            FROM training_programs
            WHERE profile_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(profile_id.to_string())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list training programs", &e))?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM training_programs WHERE profile_id = $1 AND deleted_at IS NULL",
        )
        .bind(profile_id.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("count training programs", &e))?;

        let items = rows
            .iter()
            .map(row_to_program)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((items, total))
    }

    /// Apply a partial update
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateProgramRequest,
    ) -> AppResult<Option<TrainingProgram>> {
        let result = sqlx::query(
            r"
            UPDATE training_programs SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                updated_at = $3
            WHERE id = $4 AND deleted_at IS NULL
            ",
        )
        .bind(&request.name)
        .bind(&request.description)
        .bind(now_timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("update training program", &e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Soft-delete a program
    ///
    /// Returns `false` when no live program matched.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let now = now_timestamp();
        let result = sqlx::query(
            "UPDATE training_programs SET deleted_at = $1, updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("delete training program", &e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_program(row: &SqliteRow) -> AppResult<TrainingProgram> {
    let id: String = row.get("id");
    let profile_id: String = row.get("profile_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(TrainingProgram {
        id: parse_uuid(&id)?,
        profile_id: parse_uuid(&profile_id)?,
        name: row.get("name"),
        description: row.get("description"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
