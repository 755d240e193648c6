// ABOUTME: Route handlers for the read-only exercise catalog
// ABOUTME: Paginated listing with an optional primary-muscle filter and single-entry lookup
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
use ironlog_core::errors::AppError;
use serde::{Deserialize, Serialize};

use super::extract::{parse_id, PageQuery, QueryParams};
use crate::database::exercises::Exercise;
use crate::resources::ServerResources;
use crate::services::catalog;

/// Catalog entry as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseResponse {
    /// Exercise id
    pub id: String,
    /// Display name
    pub name: String,
    /// Main muscle group
    pub primary_muscle: String,
    /// Assisting muscle groups
    pub secondary_muscles: Vec<String>,
    /// Required equipment
    pub equipment: String,
    /// Free-text description
    pub description: String,
}

impl From<Exercise> for ExerciseResponse {
    fn from(exercise: Exercise) -> Self {
        Self {
            id: exercise.id.to_string(),
            name: exercise.name,
            primary_muscle: exercise.primary_muscle,
            secondary_muscles: exercise.secondary_muscles,
            equipment: exercise.equipment,
            description: exercise.description,
        }
    }
}

/// GET /exercises query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseQuery {
    #[serde(flatten)]
    page: PageQuery,
    primary_muscle: Option<String>,
}

/// Exercise catalog routes
pub struct ExerciseRoutes;

impl ExerciseRoutes {
    /// Create all catalog routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/exercises", get(Self::handle_list))
            .route("/exercises/:exercise_id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /exercises
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<ExerciseQuery>,
    ) -> Result<Response, AppError> {
        resources.authenticator.authenticate_headers(&headers).await?;
        let page = query.page.page_request()?;

        let exercises =
            catalog::list_exercises(&resources.database, query.primary_muscle.as_deref(), page)
                .await?
                .map(ExerciseResponse::from);

        Ok((StatusCode::OK, Json(exercises)).into_response())
    }

    /// Handle GET /exercises/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(exercise_id): Path<String>,
    ) -> Result<Response, AppError> {
        resources.authenticator.authenticate_headers(&headers).await?;
        let exercise_id = parse_id("exerciseId", &exercise_id)?;

        let exercise = catalog::get_exercise(&resources.database, exercise_id).await?;
        Ok((StatusCode::OK, Json(ExerciseResponse::from(exercise))).into_response())
    }
}
