// ABOUTME: Route handlers for logged sets and the weight-per-day aggregate
// ABOUTME: Create, filtered list, read, correct, delete, and daily lifted-weight totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! Exercise log routes
//!
//! `GET /exercise-logs` filters by `workoutSessionId` when present, otherwise
//! by `exerciseId`, otherwise returns all of the caller's logs.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ironlog_core::dates::{format_date, format_timestamp, parse_optional_date};
use ironlog_core::errors::AppError;
use serde::{Deserialize, Serialize};

use super::extract::{parse_id, parse_optional_id, JsonBody, PageQuery, QueryParams};
use crate::database::exercise_logs::{DailyWeight, ExerciseLog, ExerciseLogChanges, LogFilter};
use crate::resources::ServerResources;
use crate::services::exercise_logs::{self, LogSet, WeightPerDay};

// ============================================================================
// Request and Response Types
// ============================================================================

/// Log as returned to clients
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLogResponse {
    /// Log id
    pub id: String,
    /// Catalog exercise performed
    pub exercise_id: String,
    /// Session the set belongs to
    pub workout_session_id: String,
    /// Set number within the session
    pub set_number: i64,
    /// Reps completed
    pub reps_completed: i64,
    /// Weight used
    pub weight_used: f64,
    /// Instant the set was logged
    pub logged_at: String,
}

impl From<ExerciseLog> for ExerciseLogResponse {
    fn from(log: ExerciseLog) -> Self {
        Self {
            id: log.id.to_string(),
            exercise_id: log.exercise_id.to_string(),
            workout_session_id: log.workout_session_id.to_string(),
            set_number: log.set_number,
            reps_completed: log.reps_completed,
            weight_used: log.weight_used,
            logged_at: format_timestamp(log.logged_at),
        }
    }
}

/// One day of the aggregate
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyWeightResponse {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Sum of weight times reps
    pub total_weight: f64,
}

impl From<DailyWeight> for DailyWeightResponse {
    fn from(day: DailyWeight) -> Self {
        Self {
            date: format_date(day.date),
            total_weight: day.total_weight,
        }
    }
}

/// Weight-per-day aggregate response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightPerDayResponse {
    /// Exercise the totals are for
    pub exercise_id: String,
    /// Days with logs, ascending
    pub total_weight_per_day: Vec<DailyWeightResponse>,
}

impl From<WeightPerDay> for WeightPerDayResponse {
    fn from(aggregate: WeightPerDay) -> Self {
        Self {
            exercise_id: aggregate.exercise_id.to_string(),
            total_weight_per_day: aggregate
                .total_weight_per_day
                .into_iter()
                .map(DailyWeightResponse::from)
                .collect(),
        }
    }
}

/// POST /exercise-logs body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogBody {
    #[serde(alias = "sessionId")]
    workout_session_id: String,
    exercise_id: String,
    set_number: i64,
    #[serde(alias = "reps")]
    reps_completed: i64,
    #[serde(alias = "weight")]
    weight_used: f64,
}

/// PATCH /exercise-logs/:id body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLogBody {
    set_number: Option<i64>,
    #[serde(alias = "reps")]
    reps_completed: Option<i64>,
    #[serde(alias = "weight")]
    weight_used: Option<f64>,
}

/// GET /exercise-logs query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogListQuery {
    #[serde(flatten)]
    page: PageQuery,
    workout_session_id: Option<String>,
    exercise_id: Option<String>,
}

impl LogListQuery {
    fn filter(&self) -> Result<LogFilter, AppError> {
        if let Some(session_id) =
            parse_optional_id("workoutSessionId", self.workout_session_id.as_deref())?
        {
            return Ok(LogFilter::Session(session_id));
        }
        Ok(parse_optional_id("exerciseId", self.exercise_id.as_deref())?
            .map_or(LogFilter::All, LogFilter::Exercise))
    }
}

/// GET /exercise-logs/weight-per-day query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightPerDayQuery {
    exercise_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

// ============================================================================
// Routes
// ============================================================================

/// Exercise log routes
pub struct ExerciseLogRoutes;

impl ExerciseLogRoutes {
    /// Create all exercise log routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/exercise-logs",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/exercise-logs/weight-per-day",
                get(Self::handle_weight_per_day),
            )
            .route(
                "/exercise-logs/:log_id",
                get(Self::handle_get)
                    .patch(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle POST /exercise-logs
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        JsonBody(body): JsonBody<CreateLogBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let input = LogSet {
            workout_session_id: parse_id("workoutSessionId", &body.workout_session_id)?,
            exercise_id: parse_id("exerciseId", &body.exercise_id)?,
            set_number: body.set_number,
            reps_completed: body.reps_completed,
            weight_used: body.weight_used,
        };

        let log = exercise_logs::log_set(&resources.database, auth.profile_id, input).await?;
        Ok((StatusCode::CREATED, Json(ExerciseLogResponse::from(log))).into_response())
    }

    /// Handle GET /exercise-logs
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<LogListQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let filter = query.filter()?;
        let page = query.page.page_request()?;

        let logs = exercise_logs::list_logs(&resources.database, auth.profile_id, filter, page)
            .await?
            .map(ExerciseLogResponse::from);

        Ok((StatusCode::OK, Json(logs)).into_response())
    }

    /// Handle GET /exercise-logs/weight-per-day
    async fn handle_weight_per_day(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        QueryParams(query): QueryParams<WeightPerDayQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let exercise_id = parse_optional_id("exerciseId", query.exercise_id.as_deref())?
            .ok_or_else(|| AppError::invalid_id("exerciseId"))?;
        let start = parse_optional_date("startDate", query.start_date.as_deref())?;
        let end = parse_optional_date("endDate", query.end_date.as_deref())?;

        let aggregate = exercise_logs::weight_per_day(
            &resources.database,
            auth.profile_id,
            exercise_id,
            start,
            end,
        )
        .await?;

        Ok((StatusCode::OK, Json(WeightPerDayResponse::from(aggregate))).into_response())
    }

    /// Handle GET /exercise-logs/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(log_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let log_id = parse_id("id", &log_id)?;

        let log = exercise_logs::get_log(&resources.database, auth.profile_id, log_id).await?;
        Ok((StatusCode::OK, Json(ExerciseLogResponse::from(log))).into_response())
    }

    /// Handle PATCH /exercise-logs/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(log_id): Path<String>,
        JsonBody(body): JsonBody<UpdateLogBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let log_id = parse_id("id", &log_id)?;
        let changes = ExerciseLogChanges {
            set_number: body.set_number,
            reps_completed: body.reps_completed,
            weight_used: body.weight_used,
        };

        let log =
            exercise_logs::correct_log(&resources.database, auth.profile_id, log_id, changes)
                .await?;
        Ok((StatusCode::OK, Json(ExerciseLogResponse::from(log))).into_response())
    }

    /// Handle DELETE /exercise-logs/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(log_id): Path<String>,
    ) -> Result<Response, AppError> {
        let auth = resources.authenticator.authenticate_headers(&headers).await?;
        let log_id = parse_id("id", &log_id)?;

        exercise_logs::delete_log(&resources.database, auth.profile_id, log_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_list_filter_precedence() {
        let session = Uuid::new_v4();
        let exercise = Uuid::new_v4();

        let query = LogListQuery {
            workout_session_id: Some(session.to_string()),
            exercise_id: Some(exercise.to_string()),
            ..LogListQuery::default()
        };
        assert_eq!(query.filter().unwrap(), LogFilter::Session(session));

        let query = LogListQuery {
            exercise_id: Some(exercise.to_string()),
            ..LogListQuery::default()
        };
        assert_eq!(query.filter().unwrap(), LogFilter::Exercise(exercise));

        assert_eq!(LogListQuery::default().filter().unwrap(), LogFilter::All);
    }

    #[test]
    fn test_create_body_aliases() {
        let body: CreateLogBody = serde_json::from_value(serde_json::json!({
            "sessionId": "s",
            "exerciseId": "e",
            "setNumber": 1,
            "reps": 5,
            "weight": 100.0
        }))
        .unwrap();
        assert_eq!(body.workout_session_id, "s");
        assert_eq!(body.reps_completed, 5);
    }
}
