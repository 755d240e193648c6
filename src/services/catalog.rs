// ABOUTME: Read-only exercise catalog use-cases
// ABOUTME: Paginated listing with optional primary-muscle filter and single-entry lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::{Page, PageRequest};
use uuid::Uuid;

use super::non_blank;
use crate::database::exercises::Exercise;
use crate::database::Database;

/// List catalog entries ordered by name
///
/// # Errors
///
/// Returns an error if database operation fails
pub async fn list_exercises(
    database: &Database,
    primary_muscle: Option<&str>,
    page: PageRequest,
) -> AppResult<Page<Exercise>> {
    let muscle = non_blank(primary_muscle);
    let (items, total) = database.exercises().list(muscle.as_deref(), page).await?;
    Ok(Page::new(items, total, page))
}

/// Fetch one catalog entry
///
/// # Errors
///
/// Returns `RESOURCE_NOT_FOUND` if the entry does not exist
pub async fn get_exercise(database: &Database, id: Uuid) -> AppResult<Exercise> {
    database
        .exercises()
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Exercise"))
}
