// ABOUTME: Ownership gatekeeper for training programs and the workouts inside them
// ABOUTME: Two predicates every mutating use-case calls before touching the store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! # Authorization
//!
//! Ownership flows `profile → program → workout`. The store layer never checks
//! ownership; use-cases ask [`AuthorizationService`] first.
//!
//! `can_modify_workout` reports a missing workout as `FORBIDDEN` rather than
//! `RESOURCE_NOT_FOUND`, so workout ids cannot be enumerated.

use std::sync::Arc;

use ironlog_core::errors::{AppError, AppResult, ErrorCode};
use tracing::debug;
use uuid::Uuid;

use crate::database::programs::TrainingProgram;
use crate::database::workouts::Workout;
use crate::database::Database;

/// A workout the caller may modify, with its program
#[derive(Debug, Clone)]
pub struct WorkoutGrant {
    /// The workout
    pub workout: Workout,
    /// Its program, owned by the caller
    pub program: TrainingProgram,
}

/// Ownership checks over programs and workouts
#[derive(Clone)]
pub struct AuthorizationService {
    database: Arc<Database>,
}

impl AuthorizationService {
    /// Create a new authorization service
    #[must_use]
    pub const fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Ensure `profile_id` owns program `program_id`
    ///
    /// # Errors
    ///
    /// Returns `RESOURCE_NOT_FOUND` when the program does not exist and
    /// `FORBIDDEN` when another profile owns it
    pub async fn can_modify_training_program(
        &self,
        profile_id: Uuid,
        program_id: Uuid,
    ) -> AppResult<TrainingProgram> {
        let program = self
            .database
            .programs()
            .get(program_id)
            .await?
            .ok_or_else(|| AppError::not_found("Training program"))?;

        if program.profile_id != profile_id {
            debug!(%profile_id, %program_id, "Program owned by another profile");
            return Err(AppError::forbidden(
                "You do not have access to this training program",
            ));
        }
        Ok(program)
    }

    /// Ensure `profile_id` owns the program of workout `workout_id`
    ///
    /// # Errors
    ///
    /// Returns `FORBIDDEN` when the workout does not exist or its program is
    /// owned by another profile
    pub async fn can_modify_workout(
        &self,
        profile_id: Uuid,
        workout_id: Uuid,
    ) -> AppResult<WorkoutGrant> {
        let Some(workout) = self.database.workouts().get(workout_id).await? else {
            debug!(%profile_id, %workout_id, "Workout missing, reporting as forbidden");
            return Err(AppError::forbidden("You do not have access to this workout"));
        };

        let program = self
            .can_modify_training_program(profile_id, workout.training_program_id)
            .await
            .map_err(|e| {
                if e.code == ErrorCode::ResourceNotFound {
                    AppError::forbidden("You do not have access to this workout")
                } else {
                    e
                }
            })?;

        Ok(WorkoutGrant { workout, program })
    }
}
