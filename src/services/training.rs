// ABOUTME: Training program, workout, and workout-exercise use-cases
// ABOUTME: Every operation is gated by the program or workout ownership predicate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::{Page, PageRequest};
use uuid::Uuid;

use super::non_blank;
use crate::authorization::AuthorizationService;
use crate::database::programs::{TrainingProgram, UpdateProgramRequest};
use crate::database::workout_exercises::WorkoutExercise;
use crate::database::workouts::Workout;
use crate::database::Database;

/// A workout with its ordered exercises
#[derive(Debug, Clone)]
pub struct WorkoutDetail {
    /// The workout
    pub workout: Workout,
    /// Live exercises in position order
    pub exercises: Vec<WorkoutExercise>,
}

/// Input for attaching a catalog exercise to a workout
#[derive(Debug, Clone, Copy)]
pub struct NewWorkoutExercise {
    /// Target workout
    pub workout_id: Uuid,
    /// Catalog entry
    pub exercise_id: Uuid,
    /// Prescribed sets
    pub sets: i64,
    /// Prescribed reps
    pub reps: i64,
}

fn required_name(name: &str) -> AppResult<String> {
    non_blank(Some(name)).ok_or_else(|| AppError::invalid_request("name must not be empty"))
}

fn positive(field: &str, value: i64) -> AppResult<i64> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(AppError::invalid_request(format!(
            "{field} must be at least 1"
        )))
    }
}

// ----------------------------------------------------------------------------
// Training programs
// ----------------------------------------------------------------------------

/// Create a program owned by the caller
///
/// # Errors
///
/// Returns `INVALID_REQUEST` for an empty name
pub async fn create_program(
    database: &Database,
    profile_id: Uuid,
    name: &str,
    description: Option<&str>,
) -> AppResult<TrainingProgram> {
    let name = required_name(name)?;
    let description = description.map(str::trim).unwrap_or_default();
    database
        .programs()
        .create(profile_id, &name, description)
        .await
}

/// The caller's programs, newest first
///
/// # Errors
///
/// Returns an error if database operation fails
pub async fn list_programs(
    database: &Database,
    profile_id: Uuid,
    page: PageRequest,
) -> AppResult<Page<TrainingProgram>> {
    let (items, total) = database.programs().list_by_profile(profile_id, page).await?;
    Ok(Page::new(items, total, page))
}

/// Read one program
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn get_program(
    authorization: &AuthorizationService,
    profile_id: Uuid,
    program_id: Uuid,
) -> AppResult<TrainingProgram> {
    authorization
        .can_modify_training_program(profile_id, program_id)
        .await
}

/// Partially update a program; blank values are ignored
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn update_program(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    program_id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
) -> AppResult<TrainingProgram> {
    authorization
        .can_modify_training_program(profile_id, program_id)
        .await?;

    let request = UpdateProgramRequest {
        name: non_blank(name),
        description: non_blank(description),
    };
    database
        .programs()
        .update(program_id, &request)
        .await?
        .ok_or_else(|| AppError::not_found("Training program"))
}

/// Soft-delete a program
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn delete_program(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    program_id: Uuid,
) -> AppResult<()> {
    authorization
        .can_modify_training_program(profile_id, program_id)
        .await?;

    if database.programs().delete(program_id).await? {
        Ok(())
    } else {
        Err(AppError::not_found("Training program"))
    }
}

// ----------------------------------------------------------------------------
// Workouts
// ----------------------------------------------------------------------------

/// Resolve a workout addressed through its program's path
///
/// The program check runs first. A live workout that sits under a different
/// program is reported as `FORBIDDEN`.
async fn workout_in_program(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    program_id: Uuid,
    workout_id: Uuid,
) -> AppResult<Workout> {
    authorization
        .can_modify_training_program(profile_id, program_id)
        .await?;

    let workout = database
        .workouts()
        .get(workout_id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout"))?;

    if workout.training_program_id != program_id {
        return Err(AppError::forbidden(
            "Workout does not belong to this training program",
        ));
    }
    Ok(workout)
}

/// A program's workouts in position order
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN` for the program
pub async fn list_workouts(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    program_id: Uuid,
    page: PageRequest,
) -> AppResult<Page<Workout>> {
    authorization
        .can_modify_training_program(profile_id, program_id)
        .await?;

    let (items, total) = database.workouts().list_by_program(program_id, page).await?;
    Ok(Page::new(items, total, page))
}

/// Append a workout at position `N + 1`
///
/// # Errors
///
/// Returns `INVALID_REQUEST` for an empty name, `RESOURCE_NOT_FOUND` or
/// `FORBIDDEN` for the program, `CONFLICT` on exhausted retries
pub async fn append_workout(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    program_id: Uuid,
    name: &str,
) -> AppResult<Workout> {
    let name = required_name(name)?;
    authorization
        .can_modify_training_program(profile_id, program_id)
        .await?;

    database.workouts().append(program_id, &name).await
}

/// A workout with its exercises and their catalog data
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn get_workout(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    program_id: Uuid,
    workout_id: Uuid,
) -> AppResult<WorkoutDetail> {
    let workout =
        workout_in_program(database, authorization, profile_id, program_id, workout_id).await?;
    let exercises = database
        .workout_exercises()
        .list_all_by_workout(workout.id)
        .await?;
    Ok(WorkoutDetail { workout, exercises })
}

/// Rename a workout
///
/// # Errors
///
/// Returns `INVALID_REQUEST` for an empty name, `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn rename_workout(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    program_id: Uuid,
    workout_id: Uuid,
    name: &str,
) -> AppResult<Workout> {
    let name = required_name(name)?;
    workout_in_program(database, authorization, profile_id, program_id, workout_id).await?;

    database
        .workouts()
        .rename(workout_id, &name)
        .await?
        .ok_or_else(|| AppError::not_found("Workout"))
}

/// Soft-delete a workout and close the gap it leaves
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`, `CONFLICT` on exhausted retries
pub async fn delete_workout(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    program_id: Uuid,
    workout_id: Uuid,
) -> AppResult<()> {
    workout_in_program(database, authorization, profile_id, program_id, workout_id).await?;
    database.workouts().remove(program_id, workout_id).await
}

/// Move a workout to `position` within its program
///
/// # Errors
///
/// Returns `INVALID_REQUEST` when `position` is outside `1..=N`,
/// `RESOURCE_NOT_FOUND` or `FORBIDDEN`, `CONFLICT` on exhausted retries
pub async fn reorder_workout(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    program_id: Uuid,
    workout_id: Uuid,
    position: i64,
) -> AppResult<()> {
    workout_in_program(database, authorization, profile_id, program_id, workout_id).await?;
    database
        .workouts()
        .reorder(program_id, workout_id, position)
        .await
}

// ----------------------------------------------------------------------------
// Workout exercises
// ----------------------------------------------------------------------------

/// Resolve a workout-exercise and check the caller may modify its workout
async fn owned_workout_exercise(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    id: Uuid,
) -> AppResult<WorkoutExercise> {
    let item = database
        .workout_exercises()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout exercise"))?;

    authorization
        .can_modify_workout(profile_id, item.workout_id)
        .await?;
    Ok(item)
}

/// A workout's exercises in position order
///
/// # Errors
///
/// Returns `FORBIDDEN` when the workout is missing or not the caller's
pub async fn list_workout_exercises(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    workout_id: Uuid,
    page: PageRequest,
) -> AppResult<Page<WorkoutExercise>> {
    authorization
        .can_modify_workout(profile_id, workout_id)
        .await?;

    let (items, total) = database
        .workout_exercises()
        .list_by_workout(workout_id, page)
        .await?;
    Ok(Page::new(items, total, page))
}

/// Attach a catalog exercise as the last one of a workout
///
/// Business rules:
/// - `sets` and `reps` are at least 1
/// - the caller owns the workout's program
/// - the catalog entry exists
///
/// # Errors
///
/// Returns `INVALID_REQUEST`, `FORBIDDEN`, `RESOURCE_NOT_FOUND` (exercise),
/// or `CONFLICT` on exhausted retries
pub async fn add_workout_exercise(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    input: NewWorkoutExercise,
) -> AppResult<WorkoutExercise> {
    let sets = positive("sets", input.sets)?;
    let reps = positive("reps", input.reps)?;

    authorization
        .can_modify_workout(profile_id, input.workout_id)
        .await?;

    if !database.exercises().exists(input.exercise_id).await? {
        return Err(AppError::not_found("Exercise"));
    }

    database
        .workout_exercises()
        .append(input.workout_id, input.exercise_id, sets, reps)
        .await
}

/// Read one workout-exercise
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn get_workout_exercise(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    id: Uuid,
) -> AppResult<WorkoutExercise> {
    owned_workout_exercise(database, authorization, profile_id, id).await
}

/// Change sets and/or reps
///
/// # Errors
///
/// Returns `INVALID_REQUEST` for values below 1, `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn update_workout_exercise(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    id: Uuid,
    sets: Option<i64>,
    reps: Option<i64>,
) -> AppResult<WorkoutExercise> {
    let sets = sets.map(|v| positive("sets", v)).transpose()?;
    let reps = reps.map(|v| positive("reps", v)).transpose()?;
    owned_workout_exercise(database, authorization, profile_id, id).await?;

    database
        .workout_exercises()
        .update(id, sets, reps)
        .await?
        .ok_or_else(|| AppError::not_found("Workout exercise"))
}

/// Soft-delete a workout-exercise and close the gap it leaves
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`, `CONFLICT` on exhausted retries
pub async fn remove_workout_exercise(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    id: Uuid,
) -> AppResult<()> {
    let item = owned_workout_exercise(database, authorization, profile_id, id).await?;
    database
        .workout_exercises()
        .remove(item.workout_id, id)
        .await
}

/// Move a workout-exercise to `position` within its workout
///
/// # Errors
///
/// Returns `INVALID_REQUEST` when `position` is outside `1..=N`,
/// `RESOURCE_NOT_FOUND` or `FORBIDDEN`, `CONFLICT` on exhausted retries
pub async fn reorder_workout_exercise(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    id: Uuid,
    position: i64,
) -> AppResult<()> {
    let item = owned_workout_exercise(database, authorization, profile_id, id).await?;
    database
        .workout_exercises()
        .reorder(item.workout_id, id, position)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironlog_core::errors::ErrorCode;

    #[test]
    fn test_name_rules() {
        assert_eq!(required_name("  Push  ").unwrap(), "Push");
        assert_eq!(
            required_name("   ").unwrap_err().code,
            ErrorCode::InvalidRequest
        );
    }

    #[test]
    fn test_positive() {
        assert_eq!(positive("sets", 1).unwrap(), 1);
        assert!(positive("sets", 0).is_err());
        assert!(positive("reps", -3).is_err());
    }
}
