// ABOUTME: Route handlers for training programs and the workouts nested under them
// ABOUTME: Program CRUD plus list, append, read, rename, delete, and reorder of workouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! Training program routes
//!
//! Every endpoint is owner-only. Workouts are addressed through their
//! program's path; a workout that lives under a different program of the
//! caller is reported as `FORBIDDEN`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ironlog_core::dates::format_timestamp;
use ironlog_core::errors::AppError;
use serde::{Deserialize, Serialize};

use super::extract::{parse_id, JsonBody, PageQuery, QueryParams};
use super::workout_exercises::WorkoutExerciseResponse;
use crate::database::programs::TrainingProgram;
use crate::database::workouts::Workout;
use crate::resources::ServerResources;
use crate::services::training::{self, WorkoutDetail};

// ============================================================================
// Request and Response Types
// ============================================================================

/// Program as returned to clients
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingProgramResponse {
    /// Program id
    pub id: String,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Creation instant
    pub created_at: String,
    /// Last update instant
    pub updated_at: String,
}

impl From<TrainingProgram> for TrainingProgramResponse {
    fn from(program: TrainingProgram) -> Self {
        Self {
            id: program.id.to_string(),
            name: program.name,
            description: program.description,
            created_at: format_timestamp(program.created_at),
            updated_at: format_timestamp(program.updated_at),
        }
    }
}

/// Workout as returned to clients; `exercises` only on the detail endpoint
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutResponse {
    /// Workout id
    pub id: String,
    /// Display name
    pub name: String,
    /// Parent program
    pub training_program_id: String,
    /// 1-based position in the program
    pub position: i64,
    /// Creation instant
    pub created_at: String,
    /// Last update instant
    pub updated_at: String,
    /// Prescribed exercises in position order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercises: Option<Vec<WorkoutExerciseResponse>>,
}

impl From<Workout> for WorkoutResponse {
    fn from(workout: Workout) -> Self {
        Self {
            id: workout.id.to_string(),
            name: workout.name,
            training_program_id: workout.training_program_id.to_string(),
            position: workout.position,
            created_at: format_timestamp(workout.created_at),
            updated_at: format_timestamp(workout.updated_at),
            exercises: None,
        }
    }
}

impl From<WorkoutDetail> for WorkoutResponse {
    fn from(detail: WorkoutDetail) -> Self {
        let exercises = detail
            .exercises
            .into_iter()
            .map(WorkoutExerciseResponse::from)
            .collect();
        Self {
            exercises: Some(exercises),
            ..Self::from(detail.workout)
        }
    }
}

/// POST /training-programs body
#[derive(Debug, Deserialize)]
pub struct CreateProgramBody {
    name: String,
    description: Option<String>,
}

/// PATCH /training-programs/:id body
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProgramBody {
    name: Option<String>,
    description: Option<String>,
}

/// Body of POST and PATCH on a workout
#[derive(Debug, Deserialize)]
pub struct WorkoutNameBody {
    name: String,
}

/// Body of every reorder endpoint
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ReorderBody {
    /// Requested 1-based position
    pub position: i64,
}

// ============================================================================
// Routes
// ============================================================================

/// Training program and workout routes
pub struct TrainingProgramRoutes;

impl TrainingProgramRoutes {
    /// Create all program and workout routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/training-programs",
                get(Self::handle_list_programs).post(Self::handle_create_program),
            )
            .route(
                "/training-programs/:program_id",
                get(Self::handle_get_program)
                    .patch(Self::handle_update_program)
                    .delete(Self::handle_delete_program),
            )
            .route(
                "/training-programs/:program_id/workouts",
                get(Self::handle_list_workouts).post(Self::handle_append_workout),
            )
            .route(
                "/training-programs/:program_id/workouts/:workout_id",
                get(Self::handle_get_workout)
                    .patch(Self::handle_rename_workout)
                    .delete(Self::handle_delete_workout),
            )
            .route(
                "/training-programs/:program_id/workouts/:workout_id/reorder",
                post(Self::handle_reorder_workout),
            )
            .with_state(resources)
    }

    // ------------------------------------------------------------------------
    // Programs
    // ------------------------------------------------------------------------

    /// Handle GET /training-programs
    async fn handle_list_programs(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<PageQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let page = query.page_request()?;

        let programs = training::list_programs(&resources.database, auth.profile_id, page)
            .await?
            .map(TrainingProgramResponse::from);

        Ok((StatusCode::OK, Json(programs)).into_response())
    }

    /// Handle POST /training-programs
    async fn handle_create_program(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(body): JsonBody<CreateProgramBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;

        let program = training::create_program(
            &resources.database,
            auth.profile_id,
            &body.name,
            body.description.as_deref(),
        )
        .await?;

        Ok((
            StatusCode::CREATED,
            Json(TrainingProgramResponse::from(program)),
        )
            .into_response())
    }

    /// Handle GET /training-programs/:id
    async fn handle_get_program(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(program_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let program_id = parse_id("trainingProgramId", &program_id)?;

        let program =
            training::get_program(&resources.authorization, auth.profile_id, program_id).await?;

        Ok((StatusCode::OK, Json(TrainingProgramResponse::from(program))).into_response())
    }

    /// Handle PATCH /training-programs/:id
    async fn handle_update_program(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(program_id): Path<String>,
        JsonBody(body): JsonBody<UpdateProgramBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let program_id = parse_id("trainingProgramId", &program_id)?;

        let program = training::update_program(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            program_id,
            body.name.as_deref(),
            body.description.as_deref(),
        )
        .await?;

        Ok((StatusCode::OK, Json(TrainingProgramResponse::from(program))).into_response())
    }

    /// Handle DELETE /training-programs/:id
    async fn handle_delete_program(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(program_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let program_id = parse_id("trainingProgramId", &program_id)?;

        training::delete_program(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            program_id,
        )
        .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    // ------------------------------------------------------------------------
    // Workouts
    // ------------------------------------------------------------------------

    /// Handle GET /training-programs/:id/workouts
    async fn handle_list_workouts(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(program_id): Path<String>,
        QueryParams(query): QueryParams<PageQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let program_id = parse_id("trainingProgramId", &program_id)?;
        let page = query.page_request()?;

        let workouts = training::list_workouts(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            program_id,
            page,
        )
        .await?
        .map(WorkoutResponse::from);

        Ok((StatusCode::OK, Json(workouts)).into_response())
    }

    /// Handle POST /training-programs/:id/workouts
    async fn handle_append_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(program_id): Path<String>,
        JsonBody(body): JsonBody<WorkoutNameBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let program_id = parse_id("trainingProgramId", &program_id)?;

        let workout = training::append_workout(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            program_id,
            &body.name,
        )
        .await?;

        Ok((StatusCode::CREATED, Json(WorkoutResponse::from(workout))).into_response())
    }

    /// Handle GET /training-programs/:id/workouts/:workout_id
    async fn handle_get_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((program_id, workout_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let program_id = parse_id("trainingProgramId", &program_id)?;
        let workout_id = parse_id("workoutId", &workout_id)?;

        let detail = training::get_workout(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            program_id,
            workout_id,
        )
        .await?;

        Ok((StatusCode::OK, Json(WorkoutResponse::from(detail))).into_response())
    }

    /// Handle PATCH /training-programs/:id/workouts/:workout_id
    async fn handle_rename_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((program_id, workout_id)): Path<(String, String)>,
        JsonBody(body): JsonBody<WorkoutNameBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let program_id = parse_id("trainingProgramId", &program_id)?;
        let workout_id = parse_id("workoutId", &workout_id)?;

        let workout = training::rename_workout(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            program_id,
            workout_id,
            &body.name,
        )
        .await?;

        Ok((StatusCode::OK, Json(WorkoutResponse::from(workout))).into_response())
    }

    /// Handle DELETE /training-programs/:id/workouts/:workout_id
    async fn handle_delete_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((program_id, workout_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let program_id = parse_id("trainingProgramId", &program_id)?;
        let workout_id = parse_id("workoutId", &workout_id)?;

        training::delete_workout(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            program_id,
            workout_id,
        )
        .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /training-programs/:id/workouts/:workout_id/reorder
    async fn handle_reorder_workout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((program_id, workout_id)): Path<(String, String)>,
        JsonBody(body): JsonBody<ReorderBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let program_id = parse_id("trainingProgramId", &program_id)?;
        let workout_id = parse_id("workoutId", &workout_id)?;

        training::reorder_workout(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            program_id,
            workout_id,
            body.position,
        )
        .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
