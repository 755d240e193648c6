// ABOUTME: Profile and settings use-cases for the authenticated caller
// ABOUTME: Parses and range-checks partial updates before they reach the store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use ironlog_core::dates::parse_optional_date;
use ironlog_core::errors::{AppError, AppResult};
use uuid::Uuid;

use super::non_blank;
use crate::database::profiles::{Profile, Sex, UpdateProfileRequest};
use crate::database::settings::{MeasurementUnits, Settings, UpdateSettingsRequest};
use crate::database::Database;

/// Raw profile changes as received
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    /// `male` or `female`
    pub sex: Option<String>,
    /// `YYYY-MM-DD`
    pub birthday: Option<String>,
    /// Kilograms
    pub weight: Option<f64>,
    /// Metres
    pub height: Option<f64>,
    /// Avatar location
    pub avatar_url: Option<String>,
}

/// Raw settings changes as received
#[derive(Debug, Clone, Default)]
pub struct SettingsChanges {
    /// Language tag
    pub language: Option<String>,
    /// `metric` or `imperial`
    pub measurement_units: Option<String>,
    /// IANA timezone name
    pub timezone: Option<String>,
    /// Notification toggle
    pub notifications_enabled: Option<bool>,
}

/// Fetch the caller's profile
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` if the profile is gone
pub async fn get_profile(database: &Database, profile_id: Uuid) -> AppResult<Profile> {
    database
        .profiles()
        .get(profile_id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile"))
}

/// Apply a partial profile update
///
/// Business rules:
/// - `birthday` must be `YYYY-MM-DD`
/// - `sex` must be `male` or `female`
/// - `weight` and `height` must be finite and not negative
///
/// # Errors
///
/// Returns `INVALID_DATE_FORMAT` or `INVALID_REQUEST` for rejected fields,
/// `RESOURCE_NOT_FOUND` if the profile is gone
pub async fn update_profile(
    database: &Database,
    profile_id: Uuid,
    changes: &ProfileChanges,
) -> AppResult<Profile> {
    let request = UpdateProfileRequest {
        sex: non_blank(changes.sex.as_deref())
            .as_deref()
            .map(Sex::parse)
            .transpose()?,
        birthday: parse_optional_date("birthday", changes.birthday.as_deref())?,
        weight: measurement("weight", changes.weight)?,
        height: measurement("height", changes.height)?,
        avatar_url: non_blank(changes.avatar_url.as_deref()),
    };

    database
        .profiles()
        .update(profile_id, &request)
        .await?
        .ok_or_else(|| AppError::not_found("Profile"))
}

fn measurement(field: &str, value: Option<f64>) -> AppResult<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(AppError::invalid_request(format!(
            "{field} must be a non-negative number"
        ))),
        other => Ok(other),
    }
}

/// Fetch the caller's settings
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` if no settings row exists
pub async fn get_settings(database: &Database, profile_id: Uuid) -> AppResult<Settings> {
    database
        .settings()
        .get_by_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::not_found("Settings"))
}

/// Apply a partial settings update; blank strings are ignored
///
/// # Errors
///
/// Returns `INVALID_REQUEST` for unknown measurement units,
/// `RESOURCE_NOT_FOUND` if no settings row exists
pub async fn update_settings(
    database: &Database,
    profile_id: Uuid,
    changes: &SettingsChanges,
) -> AppResult<Settings> {
    let request = UpdateSettingsRequest {
        language: non_blank(changes.language.as_deref()),
        measurement_units: non_blank(changes.measurement_units.as_deref())
            .as_deref()
            .map(MeasurementUnits::parse)
            .transpose()?,
        timezone: non_blank(changes.timezone.as_deref()),
        notifications_enabled: changes.notifications_enabled,
    };

    database
        .settings()
        .update(profile_id, &request)
        .await?
        .ok_or_else(|| AppError::not_found("Settings"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_bounds() {
        assert!(measurement("weight", Some(-1.0)).is_err());
        assert!(measurement("weight", Some(f64::NAN)).is_err());
        assert_eq!(measurement("weight", Some(80.5)).unwrap(), Some(80.5));
        assert_eq!(measurement("weight", None).unwrap(), None);
    }
}
