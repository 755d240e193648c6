// ABOUTME: Use-case layer: validation, ownership checks, and orchestration over the managers
// ABOUTME: Protocol-agnostic functions called by the HTTP routes and the integration tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! Domain service layer
//!
//! Route handlers parse the wire format and hand typed input to these
//! functions. Each function validates domain rules, asks the
//! [`AuthorizationService`](crate::authorization::AuthorizationService) or
//! compares owners, and only then calls a database manager.

use ironlog_core::errors::{AppError, AppResult};
use uuid::Uuid;

/// Exercise catalog reads
pub mod catalog;

/// Exercise logs and the weight-per-day aggregate
pub mod exercise_logs;

/// Profile and settings of the caller
pub mod profile;

/// Scheduled workouts
pub mod scheduling;

/// Workout session lifecycle
pub mod sessions;

/// Training programs, workouts, and workout-exercises
pub mod training;

/// Reject access to a profile-owned row held by someone else
pub(crate) fn ensure_owner(owner: Uuid, profile_id: Uuid, resource: &str) -> AppResult<()> {
    if owner == profile_id {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "You do not have access to this {resource}"
        )))
    }
}

/// Trimmed value, or `None` when blank
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
