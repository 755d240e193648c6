// ABOUTME: Route handlers for the caller's profile and settings
// ABOUTME: GET and PATCH on /profile and /settings, both scoped to the authenticated profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! Profile routes
//!
//! The profile is provisioned on the first authenticated request, so these
//! endpoints never need an id in the path.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ironlog_core::dates::{format_date, format_timestamp};
use ironlog_core::errors::AppError;
use serde::{Deserialize, Serialize};

use super::extract::JsonBody;
use crate::database::profiles::Profile;
use crate::database::settings::Settings;
use crate::resources::ServerResources;
use crate::services::profile::{self, ProfileChanges, SettingsChanges};

// ============================================================================
// Request and Response Types
// ============================================================================

/// Profile as returned to clients
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// Profile id
    pub id: String,
    /// Identity-provider subject
    pub external_id: String,
    /// `male`, `female`, or absent
    pub sex: Option<String>,
    /// `YYYY-MM-DD`
    pub birthday: Option<String>,
    /// Kilograms
    pub weight: Option<f64>,
    /// Metres
    pub height: Option<f64>,
    /// Avatar location
    pub avatar_url: Option<String>,
    /// Creation instant
    pub created_at: String,
    /// Last update instant
    pub updated_at: String,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id.to_string(),
            external_id: profile.external_id,
            sex: profile.sex.map(|s| s.as_str().to_owned()),
            birthday: profile.birthday.map(format_date),
            weight: profile.weight,
            height: profile.height,
            avatar_url: profile.avatar_url,
            created_at: format_timestamp(profile.created_at),
            updated_at: format_timestamp(profile.updated_at),
        }
    }
}

/// Settings as returned to clients
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    /// Language tag
    pub language: String,
    /// `metric` or `imperial`
    pub measurement_units: String,
    /// Timezone name
    pub timezone: String,
    /// Notification toggle
    pub notifications_enabled: bool,
}

impl From<Settings> for SettingsResponse {
    fn from(settings: Settings) -> Self {
        Self {
            language: settings.language,
            measurement_units: settings.measurement_units.as_str().to_owned(),
            timezone: settings.timezone,
            notifications_enabled: settings.notifications_enabled,
        }
    }
}

/// PATCH /profile body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    sex: Option<String>,
    birthday: Option<String>,
    weight: Option<f64>,
    height: Option<f64>,
    avatar_url: Option<String>,
}

/// PATCH /settings body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsBody {
    language: Option<String>,
    measurement_units: Option<String>,
    timezone: Option<String>,
    notifications_enabled: Option<bool>,
}

// ============================================================================
// Routes
// ============================================================================

/// Profile and settings routes
pub struct ProfileRoutes;

impl ProfileRoutes {
    /// Create all profile routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/profile",
                get(Self::handle_get_profile).patch(Self::handle_update_profile),
            )
            .route(
                "/settings",
                get(Self::handle_get_settings).patch(Self::handle_update_settings),
            )
            .with_state(resources)
    }

    /// Handle GET /profile
    async fn handle_get_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let profile = profile::get_profile(&resources.database, auth.profile_id).await?;
        Ok((StatusCode::OK, Json(ProfileResponse::from(profile))).into_response())
    }

    /// Handle PATCH /profile
    async fn handle_update_profile(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(body): JsonBody<UpdateProfileBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let changes = ProfileChanges {
            sex: body.sex,
            birthday: body.birthday,
            weight: body.weight,
            height: body.height,
            avatar_url: body.avatar_url,
        };
        let profile = profile::update_profile(&resources.database, auth.profile_id, &changes).await?;
        Ok((StatusCode::OK, Json(ProfileResponse::from(profile))).into_response())
    }

    /// Handle GET /settings
    async fn handle_get_settings(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let settings = profile::get_settings(&resources.database, auth.profile_id).await?;
        Ok((StatusCode::OK, Json(SettingsResponse::from(settings))).into_response())
    }

    /// Handle PATCH /settings
    async fn handle_update_settings(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(body): JsonBody<UpdateSettingsBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let changes = SettingsChanges {
            language: body.language,
            measurement_units: body.measurement_units,
            timezone: body.timezone,
            notifications_enabled: body.notifications_enabled,
        };
        let settings =
            profile::update_settings(&resources.database, auth.profile_id, &changes).await?;
        Ok((StatusCode::OK, Json(SettingsResponse::from(settings))).into_response())
    }
}
