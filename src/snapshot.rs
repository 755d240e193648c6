// ABOUTME: Versioned, self-contained snapshot document of a workout frozen at session start
// ABOUTME: Decoupled from the live entities so catalog changes never rewrite history
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! # Workout snapshots
//!
//! A session stores the workout it was started from as an opaque JSON
//! document. The document has its own schema, tagged with
//! [`SCHEMA_VERSION`](ironlog_core::constants::snapshot::SCHEMA_VERSION), so
//! that renaming or reshaping the live tables never changes what an old
//! session reads back.

use chrono::{DateTime, Utc};
use ironlog_core::constants::snapshot::SCHEMA_VERSION;
use ironlog_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::exercises::Exercise;
use crate::database::workout_exercises::WorkoutExercise;
use crate::database::workouts::Workout;

/// Snapshot document, schema version 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSnapshot {
    /// Document schema version
    pub schema_version: u32,
    /// Instant the snapshot was taken
    pub captured_at: DateTime<Utc>,
    /// Workout header
    pub workout: SnapshotWorkout,
    /// Exercises in position order
    pub exercises: Vec<SnapshotWorkoutExercise>,
}

/// Workout header inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotWorkout {
    /// Source workout
    pub id: Uuid,
    /// Name at capture time
    pub name: String,
    /// Program the workout belonged to
    pub training_program_id: Uuid,
    /// Position at capture time
    pub position: i64,
}

/// Prescribed exercise inside a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotWorkoutExercise {
    /// Source workout-exercise
    pub id: Uuid,
    /// Catalog entry
    pub exercise_id: Uuid,
    /// Prescribed sets
    pub sets: i64,
    /// Prescribed reps
    pub reps: i64,
    /// Position at capture time
    pub position: i64,
    /// Catalog data at capture time
    pub exercise: Option<SnapshotExercise>,
}

/// Catalog data inside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotExercise {
    /// Catalog entry
    pub id: Uuid,
    /// Name
    pub name: String,
    /// Main muscle group
    pub primary_muscle: String,
    /// Supporting muscle groups
    pub secondary_muscles: Vec<String>,
    /// Equipment
    pub equipment: String,
    /// Description
    pub description: String,
}

impl From<&Exercise> for SnapshotExercise {
    fn from(exercise: &Exercise) -> Self {
        Self {
            id: exercise.id,
            name: exercise.name.clone(),
            primary_muscle: exercise.primary_muscle.clone(),
            secondary_muscles: exercise.secondary_muscles.clone(),
            equipment: exercise.equipment.clone(),
            description: exercise.description.clone(),
        }
    }
}

impl From<&WorkoutExercise> for SnapshotWorkoutExercise {
    fn from(item: &WorkoutExercise) -> Self {
        Self {
            id: item.id,
            exercise_id: item.exercise_id,
            sets: item.sets,
            reps: item.reps,
            position: item.position,
            exercise: item.exercise.as_ref().map(SnapshotExercise::from),
        }
    }
}

impl WorkoutSnapshot {
    /// Freeze a workout and its exercises
    #[must_use]
    pub fn capture(
        workout: &Workout,
        exercises: &[WorkoutExercise],
        captured_at: DateTime<Utc>,
    ) -> Self {
        let mut frozen: Vec<SnapshotWorkoutExercise> =
            exercises.iter().map(SnapshotWorkoutExercise::from).collect();
        frozen.sort_by_key(|item| item.position);

        Self {
            schema_version: SCHEMA_VERSION,
            captured_at,
            workout: SnapshotWorkout {
                id: workout.id,
                name: workout.name.clone(),
                training_program_id: workout.training_program_id,
                position: workout.position,
            },
            exercises: frozen,
        }
    }

    /// Serialize to the stored document
    ///
    /// # Errors
    ///
    /// Returns an internal error if serialization fails
    pub fn to_document(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored document
    ///
    /// # Errors
    ///
    /// Returns an internal error for malformed documents or an unknown schema version
    pub fn from_document(document: &str) -> AppResult<Self> {
        let snapshot: Self = serde_json::from_str(document)?;
        if snapshot.schema_version != SCHEMA_VERSION {
            return Err(AppError::internal(format!(
                "Unsupported snapshot schema version {}",
                snapshot.schema_version
            )));
        }
        Ok(snapshot)
    }
}
