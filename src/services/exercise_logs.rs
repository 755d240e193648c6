// ABOUTME: Exercise log use-cases: record sets against a session, read, correct, delete
// ABOUTME: Also serves the per-day lifted-weight aggregate for one exercise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use chrono::{NaiveDate, Utc};
use ironlog_core::dates::ensure_inclusive_range;
use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::{Page, PageRequest};
use tracing::debug;
use uuid::Uuid;

use super::ensure_owner;
use crate::database::exercise_logs::{
    DailyWeight, ExerciseLog, ExerciseLogChanges, LogFilter, NewExerciseLog,
};
use crate::database::Database;

const RESOURCE: &str = "exercise log";

/// Input for one logged set
#[derive(Debug, Clone, Copy)]
pub struct LogSet {
    /// Session the set belongs to
    pub workout_session_id: Uuid,
    /// Catalog exercise performed
    pub exercise_id: Uuid,
    /// Set number, at least 1
    pub set_number: i64,
    /// Reps completed, not negative
    pub reps_completed: i64,
    /// Weight used, not negative
    pub weight_used: f64,
}

/// Weight-per-day aggregate for one exercise
#[derive(Debug, Clone)]
pub struct WeightPerDay {
    /// Exercise the totals are for
    pub exercise_id: Uuid,
    /// One row per day with logs, ascending
    pub total_weight_per_day: Vec<DailyWeight>,
}

fn check_set_number(value: i64) -> AppResult<i64> {
    if value >= 1 {
        Ok(value)
    } else {
        Err(AppError::invalid_request("setNumber must be at least 1"))
    }
}

fn check_reps(value: i64) -> AppResult<i64> {
    if value >= 0 {
        Ok(value)
    } else {
        Err(AppError::invalid_request("repsCompleted must not be negative"))
    }
}

fn check_weight(value: f64) -> AppResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AppError::invalid_request(
            "weightUsed must be a non-negative number",
        ))
    }
}

async fn owned(database: &Database, profile_id: Uuid, id: Uuid) -> AppResult<ExerciseLog> {
    let log = database
        .exercise_logs()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Exercise log"))?;
    ensure_owner(log.profile_id, profile_id, RESOURCE)?;
    Ok(log)
}

/// Record one set
///
/// Business rules:
/// - the session exists and is the caller's
/// - the catalog exercise exists; it need not appear in the session snapshot
/// - duplicate set numbers are accepted
///
/// # Errors
///
/// Returns `INVALID_REQUEST`, `RESOURCE_NOT_FOUND` (session or exercise), or `FORBIDDEN`
pub async fn log_set(database: &Database, profile_id: Uuid, input: LogSet) -> AppResult<ExerciseLog> {
    let set_number = check_set_number(input.set_number)?;
    let reps_completed = check_reps(input.reps_completed)?;
    let weight_used = check_weight(input.weight_used)?;

    let session = database
        .sessions()
        .get(input.workout_session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Workout session"))?;
    ensure_owner(session.profile_id, profile_id, "workout session")?;

    if !database.exercises().exists(input.exercise_id).await? {
        return Err(AppError::not_found("Exercise"));
    }

    let log = database
        .exercise_logs()
        .create(&NewExerciseLog {
            profile_id,
            workout_session_id: session.id,
            exercise_id: input.exercise_id,
            set_number,
            reps_completed,
            weight_used,
            logged_at: Utc::now(),
        })
        .await?;
    debug!(log_id = %log.id, session_id = %session.id, "Exercise set logged");
    Ok(log)
}

/// The caller's logs, newest first, optionally narrowed
///
/// # Errors
///
/// Returns an error if database operation fails
pub async fn list_logs(
    database: &Database,
    profile_id: Uuid,
    filter: LogFilter,
    page: PageRequest,
) -> AppResult<Page<ExerciseLog>> {
    let (items, total) = database
        .exercise_logs()
        .list(profile_id, filter, page)
        .await?;
    Ok(Page::new(items, total, page))
}

/// Read one log
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn get_log(database: &Database, profile_id: Uuid, id: Uuid) -> AppResult<ExerciseLog> {
    owned(database, profile_id, id).await
}

/// Correct set number, reps, or weight of a past log
///
/// # Errors
///
/// Returns `INVALID_REQUEST`, `RESOURCE_NOT_FOUND`, or `FORBIDDEN`
pub async fn correct_log(
    database: &Database,
    profile_id: Uuid,
    id: Uuid,
    changes: ExerciseLogChanges,
) -> AppResult<ExerciseLog> {
    let changes = ExerciseLogChanges {
        set_number: changes.set_number.map(check_set_number).transpose()?,
        reps_completed: changes.reps_completed.map(check_reps).transpose()?,
        weight_used: changes.weight_used.map(check_weight).transpose()?,
    };
    owned(database, profile_id, id).await?;

    database
        .exercise_logs()
        .update(id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("Exercise log"))
}

/// Soft-delete a log
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn delete_log(database: &Database, profile_id: Uuid, id: Uuid) -> AppResult<()> {
    owned(database, profile_id, id).await?;
    if database.exercise_logs().delete(id).await? {
        Ok(())
    } else {
        Err(AppError::not_found("Exercise log"))
    }
}

/// Total `weight × reps` per day for one exercise, inclusive bounds
///
/// # Errors
///
/// Returns `INVALID_DATE_RANGE` when `start > end`
pub async fn weight_per_day(
    database: &Database,
    profile_id: Uuid,
    exercise_id: Uuid,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> AppResult<WeightPerDay> {
    if let (Some(start), Some(end)) = (start, end) {
        ensure_inclusive_range(start, end)?;
    }

    let total_weight_per_day = database
        .exercise_logs()
        .weight_per_day(profile_id, exercise_id, start, end)
        .await?;
    Ok(WeightPerDay {
        exercise_id,
        total_weight_per_day,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_rules() {
        assert!(check_set_number(0).is_err());
        assert_eq!(check_reps(0).unwrap(), 0);
        assert!(check_reps(-1).is_err());
        assert!(check_weight(0.0).is_ok());
        assert!(check_weight(-2.5).is_err());
        assert!(check_weight(f64::INFINITY).is_err());
    }
}
