// ABOUTME: Database operations for per-profile settings (language, units, timezone, notifications)
// ABOUTME: Default rows are inserted alongside the profile during provisioning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use chrono::{DateTime, Utc};
use ironlog_core::dates::parse_timestamp;
use ironlog_core::errors::database::storage_error;
use ironlog_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{now_timestamp, parse_uuid};

/// Unit system used by clients to render weights and heights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementUnits {
    /// Kilograms and metres
    #[default]
    Metric,
    /// Pounds and feet
    Imperial,
}

impl MeasurementUnits {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    /// Parse a client or database value
    ///
    /// # Errors
    ///
    /// Returns `INVALID_REQUEST` for anything but `metric` or `imperial`
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            other => Err(AppError::invalid_request(format!(
                "measurementUnits must be 'metric' or 'imperial', got '{other}'"
            ))),
        }
    }
}

/// Settings row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Unique identifier
    pub id: Uuid,
    /// Owning profile
    pub profile_id: Uuid,
    /// UI language tag
    pub language: String,
    /// Unit system
    pub measurement_units: MeasurementUnits,
    /// IANA timezone name
    pub timezone: String,
    /// Whether reminders are pushed
    pub notifications_enabled: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Partial settings update; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct UpdateSettingsRequest {
    /// New language
    pub language: Option<String>,
    /// New unit system
    pub measurement_units: Option<MeasurementUnits>,
    /// New timezone
    pub timezone: Option<String>,
    /// New notification flag
    pub notifications_enabled: Option<bool>,
}

/// Settings database operations manager
pub struct SettingsManager {
    pool: SqlitePool,
}

impl SettingsManager {
    /// Create a new settings manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the default settings row for a freshly provisioned profile
    pub(crate) async fn insert_defaults(
        conn: &mut SqliteConnection,
        profile_id: &str,
        now: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO settings (id, profile_id, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT(profile_id) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(profile_id)
        .bind(now)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Get the settings of a profile
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_by_profile(&self, profile_id: Uuid) -> AppResult<Option<Settings>> {
        let row = sqlx::query(
            r"
            SELECT id, profile_id, language, measurement_units, timezone,
                   notifications_enabled, created_at, updated_at
            FROM settings
            WHERE profile_id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(profile_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("get settings", &e))?;

        row.map(|r| row_to_settings(&r)).transpose()
    }

    /// Apply a partial update and return the new row
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn update(
        &self,
        profile_id: Uuid,
        request: &UpdateSettingsRequest,
    ) -> AppResult<Option<Settings>> {
        let result = sqlx::query(
            r"
            UPDATE settings SET
                language = COALESCE($1, language),
                measurement_units = COALESCE($2, measurement_units),
                timezone = COALESCE($3, timezone),
                notifications_enabled = COALESCE($4, notifications_enabled),
                updated_at = $5
            WHERE profile_id = $6 AND deleted_at IS NULL
            ",
        )
        .bind(&request.language)
        .bind(request.measurement_units.map(|u| u.as_str()))
        .bind(&request.timezone)
        .bind(request.notifications_enabled)
        .bind(now_timestamp())
        .bind(profile_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("update settings", &e))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_profile(profile_id).await
    }
}

fn row_to_settings(row: &SqliteRow) -> AppResult<Settings> {
    let id: String = row.get("id");
    let profile_id: String = row.get("profile_id");
    let units: String = row.get("measurement_units");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Settings {
        id: parse_uuid(&id)?,
        profile_id: parse_uuid(&profile_id)?,
        language: row.get("language"),
        measurement_units: MeasurementUnits::parse(&units)?,
        timezone: row.get("timezone"),
        notifications_enabled: row.get::<i64, _>("notifications_enabled") != 0,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}
