// ABOUTME: Workout session lifecycle: start with a frozen snapshot, read, list, complete
// ABOUTME: Active sessions become Completed exactly once; repeated completion is a no-op
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::{Page, PageRequest};
use uuid::Uuid;

use super::ensure_owner;
use crate::authorization::AuthorizationService;
use crate::database::sessions::WorkoutSession;
use crate::database::Database;

const RESOURCE: &str = "workout session";

async fn owned(database: &Database, profile_id: Uuid, id: Uuid) -> AppResult<WorkoutSession> {
    let session = database
        .sessions()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout session"))?;
    ensure_owner(session.profile_id, profile_id, RESOURCE)?;
    Ok(session)
}

/// Start a session on a workout
///
/// Business rules:
/// - a missing workout is `RESOURCE_NOT_FOUND` here, not the `FORBIDDEN` of
///   the workout predicate
/// - the workout's program must be the caller's
/// - the snapshot is written in the same transaction as the session row
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn start_session(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    workout_id: Uuid,
) -> AppResult<WorkoutSession> {
    if database.workouts().get(workout_id).await?.is_none() {
        return Err(AppError::not_found("Workout"));
    }
    authorization
        .can_modify_workout(profile_id, workout_id)
        .await?;

    database.sessions().start(profile_id, workout_id).await
}

/// Read one session with its stored snapshot
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn get_session(
    database: &Database,
    profile_id: Uuid,
    id: Uuid,
) -> AppResult<WorkoutSession> {
    owned(database, profile_id, id).await
}

/// The caller's sessions, most recently started first
///
/// # Errors
///
/// Returns an error if database operation fails
pub async fn list_sessions(
    database: &Database,
    profile_id: Uuid,
    page: PageRequest,
) -> AppResult<Page<WorkoutSession>> {
    let (items, total) = database.sessions().list_by_profile(profile_id, page).await?;
    Ok(Page::new(items, total, page))
}

/// Mark a session completed
///
/// Completing an already-completed session returns it unchanged.
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn complete_session(
    database: &Database,
    profile_id: Uuid,
    id: Uuid,
) -> AppResult<WorkoutSession> {
    owned(database, profile_id, id).await?;
    database
        .sessions()
        .complete(id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout session"))
}
