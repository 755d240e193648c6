// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory database, static bearer tokens, and fixture builders for the API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `ironlog_server`

use std::sync::{Arc, Once};

use anyhow::Result;
use axum::Router;
use ironlog_server::{
    config::environment::ServerConfig,
    database::{
        exercises::{Exercise, NewExercise},
        programs::TrainingProgram,
        workouts::Workout,
        Database,
    },
    identity::StaticTokenVerifier,
    resources::ServerResources,
    routes::build_router,
};
use uuid::Uuid;

/// Token accepted for the first test user
pub const ALICE_TOKEN: &str = "alice-token";
/// Subject behind [`ALICE_TOKEN`]
pub const ALICE_SUBJECT: &str = "alice-subject";
/// Token accepted for the second test user
pub const BOB_TOKEN: &str = "bob-token";
/// Subject behind [`BOB_TOKEN`]
pub const BOB_SUBJECT: &str = "bob-subject";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Database::new("sqlite::memory:", 1).await
}

/// Shared resources over `database` with the two static test users
pub fn create_test_resources(database: Database) -> Arc<ServerResources> {
    let verifier = StaticTokenVerifier::new()
        .with_token(ALICE_TOKEN, ALICE_SUBJECT)
        .with_token(BOB_TOKEN, BOB_SUBJECT);
    Arc::new(ServerResources::new(
        database,
        Arc::new(verifier),
        ServerConfig::default(),
    ))
}

/// Full router over a fresh in-memory database
pub async fn create_test_app() -> Result<(Router, Arc<ServerResources>)> {
    let resources = create_test_resources(create_test_database().await?);
    Ok((build_router(Arc::clone(&resources)), resources))
}

/// Provision (or fetch) the profile behind a subject
pub async fn profile_id(resources: &ServerResources, subject: &str) -> Uuid {
    resources
        .database
        .profiles()
        .get_or_create_by_external_id(subject)
        .await
        .unwrap()
        .id
}

/// Insert a catalog entry
pub async fn seed_exercise(database: &Database, name: &str, primary_muscle: &str) -> Exercise {
    database
        .exercises()
        .create(&NewExercise {
            name: name.to_owned(),
            primary_muscle: primary_muscle.to_owned(),
            secondary_muscles: vec!["core".to_owned()],
            equipment: "barbell".to_owned(),
            description: format!("{name} description"),
        })
        .await
        .unwrap()
}

/// Create a program owned by `profile_id`
pub async fn seed_program(database: &Database, profile_id: Uuid, name: &str) -> TrainingProgram {
    database
        .programs()
        .create(profile_id, name, "")
        .await
        .unwrap()
}

/// Append a workout to a program
pub async fn seed_workout(database: &Database, program_id: Uuid, name: &str) -> Workout {
    database.workouts().append(program_id, name).await.unwrap()
}
