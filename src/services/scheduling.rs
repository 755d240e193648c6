// ABOUTME: Scheduled workout use-cases: plan, list by date range, next upcoming, edit, delete
// ABOUTME: Creation is gated by workout ownership; entries are owned by the scheduling profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use chrono::NaiveDate;
use ironlog_core::dates::ensure_strict_range;
use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::{Page, PageRequest};
use uuid::Uuid;

use super::ensure_owner;
use crate::authorization::AuthorizationService;
use crate::database::scheduled::ScheduledWorkout;
use crate::database::Database;

const RESOURCE: &str = "scheduled workout";

async fn owned(database: &Database, profile_id: Uuid, id: Uuid) -> AppResult<ScheduledWorkout> {
    let entry = database
        .scheduled()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Scheduled workout"))?;
    ensure_owner(entry.profile_id, profile_id, RESOURCE)?;
    Ok(entry)
}

/// Plan a workout on a date
///
/// # Errors
///
/// Returns `FORBIDDEN` when the workout is missing or not the caller's
pub async fn schedule_workout(
    database: &Database,
    authorization: &AuthorizationService,
    profile_id: Uuid,
    workout_id: Uuid,
    date: NaiveDate,
    notes: Option<&str>,
) -> AppResult<ScheduledWorkout> {
    authorization
        .can_modify_workout(profile_id, workout_id)
        .await?;

    let notes = notes.map(str::trim).unwrap_or_default();
    database
        .scheduled()
        .create(profile_id, workout_id, date, notes)
        .await
}

/// The caller's entries with `start <= date <= end`, earliest first
///
/// # Errors
///
/// Returns `INVALID_DATE_RANGE` when both bounds are given and `start >= end`
pub async fn list_scheduled(
    database: &Database,
    profile_id: Uuid,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    page: PageRequest,
) -> AppResult<Page<ScheduledWorkout>> {
    ensure_strict_range(start, end)?;
    let (items, total) = database
        .scheduled()
        .list_by_profile(profile_id, start, end, page)
        .await?;
    Ok(Page::new(items, total, page))
}

/// The entry with the smallest date on or after `today`
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` when nothing is planned
pub async fn next_scheduled(
    database: &Database,
    profile_id: Uuid,
    today: NaiveDate,
) -> AppResult<ScheduledWorkout> {
    database
        .scheduled()
        .next_upcoming(profile_id, today)
        .await?
        .ok_or_else(|| AppError::not_found("Upcoming scheduled workout"))
}

/// Read one entry
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn get_scheduled(
    database: &Database,
    profile_id: Uuid,
    id: Uuid,
) -> AppResult<ScheduledWorkout> {
    owned(database, profile_id, id).await
}

/// Change date and/or notes
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn update_scheduled(
    database: &Database,
    profile_id: Uuid,
    id: Uuid,
    date: Option<NaiveDate>,
    notes: Option<&str>,
) -> AppResult<ScheduledWorkout> {
    owned(database, profile_id, id).await?;
    database
        .scheduled()
        .update(id, date, notes.map(str::trim))
        .await?
        .ok_or_else(|| AppError::not_found("Scheduled workout"))
}

/// Soft-delete an entry
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` or `FORBIDDEN`
pub async fn delete_scheduled(database: &Database, profile_id: Uuid, id: Uuid) -> AppResult<()> {
    owned(database, profile_id, id).await?;
    if database.scheduled().delete(id).await? {
        Ok(())
    } else {
        Err(AppError::not_found("Scheduled workout"))
    }
}
