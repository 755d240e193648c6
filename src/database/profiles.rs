// ABOUTME: Database operations for profiles keyed by the identity-provider subject
// ABOUTME: Provisions profile and default settings atomically on first sight of a subject
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use chrono::{DateTime, NaiveDate, Utc};
use ironlog_core::dates::{format_date, parse_date, parse_timestamp};
use ironlog_core::errors::database::storage_error;
use ironlog_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use super::settings::SettingsManager;
use super::{now_timestamp, parse_uuid};

/// Biological sex recorded on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    /// Male
    Male,
    /// Female
    Female,
}

impl Sex {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parse a client or database value
    ///
    /// # Errors
    ///
    /// Returns `INVALID_REQUEST` for unknown values
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(AppError::invalid_request(format!(
                "sex must be 'male' or 'female', got '{other}'"
            ))),
        }
    }
}

/// The authenticated user's domain record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier
    pub id: Uuid,
    /// Identity-provider subject, immutable
    pub external_id: String,
    /// Optional sex
    pub sex: Option<Sex>,
    /// Optional birthday
    pub birthday: Option<NaiveDate>,
    /// Body weight in kilograms
    pub weight: Option<f64>,
    /// Height in metres
    pub height: Option<f64>,
    /// Avatar image location
    pub avatar_url: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Partial profile update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    /// New sex
    pub sex: Option<Sex>,
    /// New birthday
    pub birthday: Option<NaiveDate>,
    /// New weight in kilograms
    pub weight: Option<f64>,
    /// New height in metres
    pub height: Option<f64>,
    /// New avatar location
    pub avatar_url: Option<String>,
}

/// Profile database operations manager
pub struct ProfilesManager {
    pool: SqlitePool,
}

impl ProfilesManager {
    /// Create a new profiles manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve a subject to its profile, provisioning profile and settings on first sight
    ///
    /// Concurrent first requests for the same subject converge on one row.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_or_create_by_external_id(&self, external_id: &str) -> AppResult<Profile> {
        if let Some(profile) = self.get_by_external_id(external_id).await? {
            return Ok(profile);
        }

        let now = now_timestamp();
        let id = Uuid::new_v4().to_string();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("begin profile provisioning", &e))?;

        let inserted = sqlx::query(
            r"
            INSERT INTO profiles (id, external_id, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT(external_id) DO NOTHING
            ",
        )
        .bind(&id)
        .bind(external_id)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error("create profile", &e))?
        .rows_affected()
            > 0;

        if inserted {
            SettingsManager::insert_defaults(&mut *tx, &id, &now)
                .await
                .map_err(|e| storage_error("create default settings", &e))?;
        }

        tx.commit()
            .await
            .map_err(|e| storage_error("commit profile provisioning", &e))?;

        if inserted {
            info!(profile_id = %id, "Provisioned new profile");
        }

        self.get_by_external_id(external_id)
            .await?
            .ok_or_else(|| AppError::internal("Profile vanished after provisioning"))
    }

    /// Get a profile by subject
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_by_external_id(&self, external_id: &str) -> AppResult<Option<Profile>> {
        let row = sqlx::query(
            r"
            SELECT id, external_id, sex, birthday, weight, height, avatar_url,
                   created_at, updated_at
            FROM profiles
            WHERE external_id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get profile by subject", &e))?;

        row.map(|r| row_to_profile(&r)).transpose()
    }

    /// Get a profile by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Profile>> {
        let row = sqlx::query(
            r"
            SELECT id, external_id, sex, birthday, weight, height, avatar_url,
                   created_at, updated_at
            FROM profiles
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get profile", &e))?;

        row.map(|r| row_to_profile(&r)).transpose()
    }

    /// Apply a partial update and return the new row
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateProfileRequest,
    ) -> AppResult<Option<Profile>> {
        let result = sqlx::query(
            r"
            UPDATE profiles SET
                sex = COALESCE($1, sex),
                birthday = COALESCE($2, birthday),
                weight = COALESCE($3, weight),
                height = COALESCE($4, height),
                avatar_url = COALESCE($5, avatar_url),
                updated_at = $6
            WHERE id = $7 AND deleted_at IS NULL
            ",
        )
        .bind(request.sex.map(|s| s.as_str()))
        .bind(request.birthday.map(format_date))
        .bind(request.weight)
        .bind(request.height)
        .bind(&request.avatar_url)
        .bind(now_timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("update profile", &e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}

fn row_to_profile(row: &SqliteRow) -> AppResult<Profile> {
    let id: String = row.get("id");
    let sex: Option<String> = row.get("sex");
    let birthday: Option<String> = row.get("birthday");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Profile {
        id: parse_uuid(&id)?,
        external_id: row.get("external_id"),
        sex: sex.as_deref().map(Sex::parse).transpose()?,
        birthday: birthday
            .as_deref()
            .map(|raw| parse_date("birthday", raw))
            .transpose()?,
        weight: row.get("weight"),
        height: row.get("height"),
        avatar_url: row.get("avatar_url"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
