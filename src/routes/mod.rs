// ABOUTME: Route module organization for the Ironlog HTTP API
// ABOUTME: Assembles per-domain routers and the shared middleware stack into one router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! HTTP routes organized by domain
//!
//! Each domain module contains only route definitions and thin handlers that
//! parse the request, authenticate the caller, and delegate to `services`.

/// Catalog routes
pub mod exercises;
/// Exercise log and aggregate routes
pub mod exercise_logs;
/// Request extraction helpers
pub mod extract;
/// Health check and readiness routes
pub mod health;
/// Profile and settings routes
pub mod profile;
/// Scheduled workout routes
pub mod scheduled_workouts;
/// Training program and workout routes
pub mod training_programs;
/// Workout-exercise routes
pub mod workout_exercises;
/// Workout session routes
pub mod workout_sessions;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use ironlog_core::errors::AppError;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use exercise_logs::ExerciseLogRoutes;
pub use exercises::ExerciseRoutes;
pub use health::HealthRoutes;
pub use profile::ProfileRoutes;
pub use scheduled_workouts::ScheduledWorkoutRoutes;
pub use training_programs::TrainingProgramRoutes;
pub use workout_exercises::WorkoutExerciseRoutes;
pub use workout_sessions::WorkoutSessionRoutes;

use crate::middleware::{create_request_span, request_id_middleware, setup_cors};
use crate::resources::ServerResources;

/// Build the complete application router with its middleware stack
///
/// Layer order, outermost first: request id, trace span, timeout, CORS. The
/// body limit is enforced by the JSON extractors through `DefaultBodyLimit`.
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let http = resources.config.http.clone();

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(ProfileRoutes::routes(Arc::clone(&resources)))
        .merge(ExerciseRoutes::routes(Arc::clone(&resources)))
        .merge(TrainingProgramRoutes::routes(Arc::clone(&resources)))
        .merge(WorkoutExerciseRoutes::routes(Arc::clone(&resources)))
        .merge(ScheduledWorkoutRoutes::routes(Arc::clone(&resources)))
        .merge(WorkoutSessionRoutes::routes(Arc::clone(&resources)))
        .merge(ExerciseLogRoutes::routes(resources))
        .fallback(handle_unknown_route)
        .layer(DefaultBodyLimit::max(http.max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(create_request_span)
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(TimeoutLayer::new(Duration::from_secs(
                    http.request_timeout_secs,
                )))
                .layer(setup_cors(&http)),
        )
}

async fn handle_unknown_route() -> AppError {
    AppError::not_found("Route")
}
