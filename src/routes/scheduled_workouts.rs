// ABOUTME: Route handlers for planning workouts on calendar dates
// ABOUTME: Create, list by date range, next upcoming, read, update, and delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use ironlog_core::dates::{format_date, parse_date, parse_optional_date};
use ironlog_core::errors::AppError;
use serde::{Deserialize, Serialize};

use super::extract::{parse_id, JsonBody, PageQuery, QueryParams};
use crate::database::scheduled::ScheduledWorkout;
use crate::resources::ServerResources;
use crate::services::scheduling;

/// Scheduled workout as returned to clients
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledWorkoutResponse {
    /// Entry id
    pub id: String,
    /// Planned workout
    pub workout_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// Free-form notes
    pub notes: String,
}

impl From<ScheduledWorkout> for ScheduledWorkoutResponse {
    fn from(entry: ScheduledWorkout) -> Self {
        Self {
            id: entry.id.to_string(),
            workout_id: entry.workout_id.to_string(),
            date: format_date(entry.date),
            notes: entry.notes,
        }
    }
}

/// GET /scheduled-workouts query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledQuery {
    #[serde(flatten)]
    page: PageQuery,
    start_date: Option<String>,
    end_date: Option<String>,
}

/// POST /scheduled-workouts body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduledBody {
    workout_id: String,
    date: String,
    notes: Option<String>,
}

/// PATCH /scheduled-workouts/:id body
#[derive(Debug, Default, Deserialize)]
pub struct UpdateScheduledBody {
    date: Option<String>,
    notes: Option<String>,
}

/// Scheduled workout routes
pub struct ScheduledWorkoutRoutes;

impl ScheduledWorkoutRoutes {
    /// Create all scheduling routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/scheduled-workouts",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route("/scheduled-workouts/next", get(Self::handle_next))
            .route(
                "/scheduled-workouts/:entry_id",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /scheduled-workouts?startDate&endDate
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<ScheduledQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let start = parse_optional_date("startDate", query.start_date.as_deref())?;
        let end = parse_optional_date("endDate", query.end_date.as_deref())?;
        let page = query.page.page_request()?;

        let entries =
            scheduling::list_scheduled(&resources.database, auth.profile_id, start, end, page)
                .await?
                .map(ScheduledWorkoutResponse::from);

        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle POST /scheduled-workouts
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(body): JsonBody<CreateScheduledBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let workout_id = parse_id("workoutId", &body.workout_id)?;
        let date = parse_date("date", &body.date)?;

        let entry = scheduling::schedule_workout(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            workout_id,
            date,
            body.notes.as_deref(),
        )
        .await?;

        Ok((
            StatusCode::CREATED,
            Json(ScheduledWorkoutResponse::from(entry)),
        )
            .into_response())
    }

    /// Handle GET /scheduled-workouts/next
    async fn handle_next(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let today = Utc::now().date_naive();

        let entry = scheduling::next_scheduled(&resources.database, auth.profile_id, today).await?;
        Ok((StatusCode::OK, Json(ScheduledWorkoutResponse::from(entry))).into_response())
    }

    /// Handle GET /scheduled-workouts/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let entry_id = parse_id("id", &entry_id)?;

        let entry = scheduling::get_scheduled(&resources.database, auth.profile_id, entry_id).await?;
        Ok((StatusCode::OK, Json(ScheduledWorkoutResponse::from(entry))).into_response())
    }

    /// Handle PATCH /scheduled-workouts/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<String>,
        JsonBody(body): JsonBody<UpdateScheduledBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let entry_id = parse_id("id", &entry_id)?;
        let date = parse_optional_date("date", body.date.as_deref())?;

        let entry = scheduling::update_scheduled(
            &resources.database,
            auth.profile_id,
            entry_id,
            date,
            body.notes.as_deref(),
        )
        .await?;

        Ok((StatusCode::OK, Json(ScheduledWorkoutResponse::from(entry))).into_response())
    }

    /// Handle DELETE /scheduled-workouts/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let entry_id = parse_id("id", &entry_id)?;

        scheduling::delete_scheduled(&resources.database, auth.profile_id, entry_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
