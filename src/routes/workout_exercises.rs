// ABOUTME: Route handlers for the exercises prescribed inside a workout
// ABOUTME: List, attach, read, update, remove, and reorder guarded by workout ownership
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! Workout-exercise routes
//!
//! Items are addressed by their own id; the parent workout is resolved from
//! the stored row and checked with the workout ownership predicate, which
//! reports a missing workout as `FORBIDDEN`.

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

use super::exercises::ExerciseResponse;
use super::extract::{parse_id, parse_optional_id, JsonBody, PageQuery, QueryParams};
use super::training_programs::ReorderBody;
use crate::database::workout_exercises::WorkoutExercise;
use crate::resources::ServerResources;
use crate::services::training::{self, NewWorkoutExercise};

/// Workout-exercise as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseResponse {
    /// Item id
    pub id: String,
    /// Parent workout
    pub workout_id: String,
    /// Catalog entry
    pub exercise_id: String,
    /// Prescribed sets
    pub sets: i64,
    /// Prescribed reps
    pub reps: i64,
    /// 1-based position in the workout
    pub position: i64,
    /// Catalog data, omitted when the entry was retired
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise: Option<ExerciseResponse>,
    /// Creation instant
    pub created_at: String,
    /// Last update instant
    pub updated_at: String,
}

impl From<WorkoutExercise> for WorkoutExerciseResponse {
    fn from(item: WorkoutExercise) -> Self {
        Self {
            id: item.id.to_string(),
            workout_id: item.workout_id.to_string(),
            exercise_id: item.exercise_id.to_string(),
            sets: item.sets,
            reps: item.reps,
            position: item.position,
            exercise: item.exercise.map(ExerciseResponse::from),
            created_at: format_timestamp(item.created_at),
            updated_at: format_timestamp(item.updated_at),
        }
    }
}

/// GET /workout-exercises query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExerciseQuery {
    #[serde(flatten)]
    page: PageQuery,
    workout_id: Option<String>,
}

/// POST /workout-exercises body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutExerciseBody {
    workout_id: String,
    exercise_id: String,
    sets: i64,
    reps: i64,
}

/// PATCH /workout-exercises/:id body
#[derive(Debug, Default, Deserialize)]
pub struct UpdateWorkoutExerciseBody {
    sets: Option<i64>,
    reps: Option<i64>,
}

/// Workout-exercise routes
pub struct WorkoutExerciseRoutes;

impl WorkoutExerciseRoutes {
    /// Create all workout-exercise routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/workout-exercises",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/workout-exercises/:item_id",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/workout-exercises/:item_id/reorder",
                post(Self::handle_reorder),
            )
            .with_state(resources)
    }

    /// Handle GET /workout-exercises?workoutId=
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<WorkoutExerciseQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let workout_id = parse_optional_id("workoutId", query.workout_id.as_deref())?
            .ok_or_else(|| AppError::invalid_id("workoutId"))?;
        let page = query.page.page_request()?;

        let items = training::list_workout_exercises(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            workout_id,
            page,
        )
        .await?
        .map(WorkoutExerciseResponse::from);

        Ok((StatusCode::OK, Json(items)).into_response())
    }

    /// Handle POST /workout-exercises
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(body): JsonBody<CreateWorkoutExerciseBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let input = NewWorkoutExercise {
            workout_id: parse_id("workoutId", &body.workout_id)?,
            exercise_id: parse_id("exerciseId", &body.exercise_id)?,
            sets: body.sets,
            reps: body.reps,
        };

        let item = training::add_workout_exercise(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            input,
        )
        .await?;

        Ok((
            StatusCode::CREATED,
            Json(WorkoutExerciseResponse::from(item)),
        )
            .into_response())
    }

    /// Handle GET /workout-exercises/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(item_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let item_id = parse_id("id", &item_id)?;

        let item = training::get_workout_exercise(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            item_id,
        )
        .await?;

        Ok((StatusCode::OK, Json(WorkoutExerciseResponse::from(item))).into_response())
    }

    /// Handle PATCH /workout-exercises/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(item_id): Path<String>,
        JsonBody(body): JsonBody<UpdateWorkoutExerciseBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let item_id = parse_id("id", &item_id)?;

        let item = training::update_workout_exercise(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            item_id,
            body.sets,
            body.reps,
        )
        .await?;

        Ok((StatusCode::OK, Json(WorkoutExerciseResponse::from(item))).into_response())
    }

    /// Handle DELETE /workout-exercises/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(item_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let item_id = parse_id("id", &item_id)?;

        training::remove_workout_exercise(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            item_id,
        )
        .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /workout-exercises/:id/reorder
    async fn handle_reorder(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(item_id): Path<String>,
        JsonBody(body): JsonBody<ReorderBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let item_id = parse_id("id", &item_id)?;

        training::reorder_workout_exercise(
            &resources.database,
            &resources.authorization,
            auth.profile_id,
            item_id,
            body.position,
        )
        .await?;

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
