// ABOUTME: Route handlers for workout sessions and their frozen snapshots
// ABOUTME: Start, list, read, and complete; snapshots are version-checked on read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ironlog_core::dates::format_timestamp;
use ironlog_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use super::extract::{parse_id, JsonBody, PageQuery, QueryParams};
use crate::database::sessions::WorkoutSession;
use crate::resources::ServerResources;
use crate::services::sessions;
use crate::snapshot::WorkoutSnapshot;

/// Session as returned to clients
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSessionResponse {
    /// Session id
    pub id: String,
    /// Workout the session was started from
    pub workout_id: String,
    /// Start instant
    pub started_at: String,
    /// Completion instant, `null` while active
    pub completed_at: Option<String>,
    /// Snapshot document captured at start
    pub snapshot: WorkoutSnapshot,
}

impl TryFrom<WorkoutSession> for WorkoutSessionResponse {
    type Error = AppError;

    fn try_from(session: WorkoutSession) -> AppResult<Self> {
        let snapshot = session.snapshot()?;
        Ok(Self {
            id: session.id.to_string(),
            workout_id: session.workout_id.to_string(),
            started_at: format_timestamp(session.started_at),
            completed_at: session.completed_at.map(format_timestamp),
            snapshot,
        })
    }
}

/// POST /workout-sessions body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionBody {
    workout_id: String,
}

/// Workout session routes
pub struct WorkoutSessionRoutes;

impl WorkoutSessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/workout-sessions",
                get(Self::handle_list).post(Self::handle_start),
            )
            .route("/workout-sessions/:session_id", get(Self::handle_get))
            .route(
                "/workout-sessions/:session_id/complete",
                post(Self::handle_complete),
            )
            .with_state(resources)
    }

    /// Handle POST /workout-sessions
    async fn handle_start(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(body): JsonBody<StartSessionBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let workout_id = parse_id("workoutId", &body.workout_id)?;

        let session = sessions::start_session(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            workout_id,
        )
        .await?;

        let response = WorkoutSessionResponse::try_from(session)?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /workout-sessions
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<PageQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let page = query.page_request()?;

        let response = sessions::list_sessions(&resources.database, auth.profile_id, page)
            .await?
            .try_map(WorkoutSessionResponse::try_from)?;

        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /workout-sessions/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(session_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let session_id = parse_id("id", &session_id)?;

        let session = sessions::get_session(&resources.database, auth.profile_id, session_id).await?;
        let response = WorkoutSessionResponse::try_from(session)?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /workout-sessions/:id/complete
    ///
    /// Completing an already completed session returns it unchanged.
    async fn handle_complete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(session_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let session_id = parse_id("id", &session_id)?;

        let session =
            sessions::complete_session(&resources.database, auth.profile_id, session_id).await?;
        let response = WorkoutSessionResponse::try_from(session)?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
