// ABOUTME: Ordered-collection protocol keeping sibling positions a dense 1..N permutation
// ABOUTME: Append, remove, and reorder run in one transaction with retry on write contention
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! # Positions
//!
//! Workouts inside a program and workout-exercises inside a workout carry a
//! `position` that must stay a gap-free `1..=N` over live rows. Each
//! position-changing transaction:
//!
//! 1. writes the parent row first, taking the SQLite write lock before any
//!    read (the equivalent of `SELECT ... FOR UPDATE` on the parent);
//! 2. shifts siblings in two steps through negative values, so the unique
//!    partial index on `(parent, position)` never sees a transient duplicate;
//! 3. commits, or rolls back when the future is dropped.
//!
//! Unique-violation and busy/locked failures restart the whole transaction
//! through [`with_retry`] with a linear backoff.

use std::future::Future;
use std::time::Duration;

use ironlog_core::constants::ordering::{BACKOFF_STEP_MS, MAX_ATTEMPTS};
use ironlog_core::errors::database::{classify, storage_error};
use ironlog_core::errors::{AppError, AppResult};
use sqlx::{Row, SqliteConnection};
use tracing::{debug, warn};

/// Failure inside a position transaction
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    /// Storage failure, possibly retryable
    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
    /// Domain failure, never retried
    #[error(transparent)]
    Domain(#[from] AppError),
}

impl TxError {
    /// Collapse into an [`AppError`], wrapping storage failures with `operation`
    #[must_use]
    pub fn into_app_error(self, operation: &str) -> AppError {
        match self {
            Self::Storage(error) => storage_error(operation, &error),
            Self::Domain(error) => error,
        }
    }
}

/// Result of one transaction attempt
pub type TxResult<T> = Result<T, TxError>;

/// Run `attempt` until it succeeds, fails terminally, or exhausts the retry budget
///
/// `operation` is a verb phrase used in logs and error messages.
///
/// # Errors
///
/// Returns the domain error of a failed attempt, `CONFLICT` after
/// [`MAX_ATTEMPTS`] contended attempts, or an internal error wrapping any other
/// storage failure
pub async fn with_retry<T, F, Fut>(operation: &str, mut attempt: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TxResult<T>>,
{
    let mut tries = 0;
    loop {
        tries += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(TxError::Domain(error)) => return Err(error),
            Err(TxError::Storage(error)) => {
                let failure = classify(&error);
                if !failure.is_retryable() {
                    return Err(storage_error(operation, &error));
                }
                if tries >= MAX_ATTEMPTS {
                    warn!(operation, attempts = tries, "Giving up on contended write");
                    return Err(AppError::conflict(format!(
                        "Could not {operation} after {tries} attempts"
                    ))
                    .with_source(error));
                }
                debug!(operation, attempt = tries, ?failure, "Retrying contended write");
                tokio::time::sleep(Duration::from_millis(BACKOFF_STEP_MS * u64::from(tries)))
                    .await;
            }
        }
    }
}

/// A table whose live rows are ordered densely under a parent row
#[derive(Debug, Clone, Copy)]
pub struct PositionScope {
    /// Child table
    pub table: &'static str,
    /// Column in the child table referencing the parent
    pub parent_column: &'static str,
    /// Parent table
    pub parent_table: &'static str,
    /// Child name used in not-found messages
    pub entity: &'static str,
    /// Parent name used in not-found messages
    pub parent_entity: &'static str,
}

/// Workouts ordered within a training program
pub const WORKOUTS: PositionScope = PositionScope {
    table: "workouts",
    parent_column: "training_program_id",
    parent_table: "training_programs",
    entity: "Workout",
    parent_entity: "Training program",
};

/// Workout-exercises ordered within a workout
pub const WORKOUT_EXERCISES: PositionScope = PositionScope {
    table: "workout_exercises",
    parent_column: "workout_id",
    parent_table: "workouts",
    entity: "Workout exercise",
    parent_entity: "Workout",
};

impl PositionScope {
    /// Write the live parent row, taking the write lock
    ///
    /// Fails with `RESOURCE_NOT_FOUND` when the parent is missing or deleted.
    pub async fn lock_parent(
        &self,
        conn: &mut SqliteConnection,
        parent_id: &str,
        now: &str,
    ) -> TxResult<()> {
        let sql = format!(
            "UPDATE {} SET updated_at = $1 WHERE id = $2 AND deleted_at IS NULL",
            self.parent_table
        );
        let result = sqlx::query(&sql)
            .bind(now)
            .bind(parent_id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(self.parent_entity).into());
        }
        Ok(())
    }

    /// Position for a new last sibling
    pub async fn next_position(
        &self,
        conn: &mut SqliteConnection,
        parent_id: &str,
    ) -> TxResult<i64> {
        let sql = format!(
            "SELECT COALESCE(MAX(position), 0) + 1 AS next FROM {} WHERE {} = $1 AND deleted_at IS NULL",
            self.table, self.parent_column
        );
        let row = sqlx::query(&sql)
            .bind(parent_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.get("next"))
    }

    /// Number of live siblings
    pub async fn count_live(&self, conn: &mut SqliteConnection, parent_id: &str) -> TxResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) AS n FROM {} WHERE {} = $1 AND deleted_at IS NULL",
            self.table, self.parent_column
        );
        let row = sqlx::query(&sql)
            .bind(parent_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(row.get("n"))
    }

    async fn current_position(
        &self,
        conn: &mut SqliteConnection,
        parent_id: &str,
        id: &str,
    ) -> TxResult<i64> {
        let sql = format!(
            "SELECT position FROM {} WHERE id = $1 AND {} = $2 AND deleted_at IS NULL",
            self.table, self.parent_column
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(parent_id)
            .fetch_optional(&mut *conn)
            .await?;
        row.map(|r| r.get::<i64, _>("position"))
            .ok_or_else(|| AppError::not_found(self.entity).into())
    }

    /// Add `delta` to every live sibling with `low <= position <= high`
    ///
    /// Rows are first moved to `-(position + delta)` and then flipped back, so
    /// no intermediate state repeats a live position.
    async fn shift(
        &self,
        conn: &mut SqliteConnection,
        parent_id: &str,
        low: i64,
        high: i64,
        delta: i64,
        now: &str,
    ) -> TxResult<()> {
        let park = format!(
            "UPDATE {} SET position = -(position + $1), updated_at = $2 \
             WHERE {} = $3 AND deleted_at IS NULL AND position >= $4 AND position <= $5",
            self.table, self.parent_column
        );
        sqlx::query(&park)
            .bind(delta)
            .bind(now)
            .bind(parent_id)
            .bind(low)
            .bind(high)
            .execute(&mut *conn)
            .await?;

        let restore = format!(
            "UPDATE {} SET position = -position \
             WHERE {} = $1 AND deleted_at IS NULL AND position < 0",
            self.table, self.parent_column
        );
        sqlx::query(&restore)
            .bind(parent_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Soft-delete `id` and close the gap it leaves
    ///
    /// The caller must already hold the parent lock.
    pub async fn remove(
        &self,
        conn: &mut SqliteConnection,
        parent_id: &str,
        id: &str,
        now: &str,
    ) -> TxResult<()> {
        let position = self.current_position(conn, parent_id, id).await?;

        let sql = format!(
            "UPDATE {} SET deleted_at = $1, updated_at = $1 WHERE id = $2",
            self.table
        );
        sqlx::query(&sql)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        self.shift(conn, parent_id, position + 1, i64::MAX, -1, now)
            .await
    }

    /// Move `id` to `new_position`, sliding the siblings in between
    ///
    /// The caller must already hold the parent lock. Moving to the current
    /// position is a no-op.
    pub async fn reorder(
        &self,
        conn: &mut SqliteConnection,
        parent_id: &str,
        id: &str,
        new_position: i64,
        now: &str,
    ) -> TxResult<()> {
        let current = self.current_position(conn, parent_id, id).await?;
        let count = self.count_live(conn, parent_id).await?;

        if !(1..=count).contains(&new_position) {
            return Err(AppError::invalid_position(new_position, count).into());
        }
        if current == new_position {
            return Ok(());
        }

        self.set_position(conn, id, 0, now).await?;
        if current < new_position {
            self.shift(conn, parent_id, current + 1, new_position, -1, now)
                .await?;
        } else {
            self.shift(conn, parent_id, new_position, current - 1, 1, now)
                .await?;
        }
        self.set_position(conn, id, new_position, now).await
    }

    async fn set_position(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        position: i64,
        now: &str,
    ) -> TxResult<()> {
        let sql = format!(
            "UPDATE {} SET position = $1, updated_at = $2 WHERE id = $3",
            self.table
        );
        sqlx::query(&sql)
            .bind(position)
            .bind(now)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

/// Positions of the live children of `parent_id`, in order
///
/// Used by tests and diagnostics to check the permutation invariant.
///
/// # Errors
///
/// Returns an internal error if the query fails
pub async fn live_positions(
    pool: &sqlx::SqlitePool,
    scope: PositionScope,
    parent_id: &str,
) -> AppResult<Vec<i64>> {
    let sql = format!(
        "SELECT position FROM {} WHERE {} = $1 AND deleted_at IS NULL ORDER BY position",
        scope.table, scope.parent_column
    );
    let rows = sqlx::query(&sql)
        .bind(parent_id)
        .fetch_all(pool)
        .await
        .map_err(|e| storage_error("list positions", &e))?;
    Ok(rows.iter().map(|r| r.get("position")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironlog_core::errors::ErrorCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_stops_on_domain_error() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_retry("reorder workout", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TxError::Domain(AppError::invalid_position(0, 3))) }
        })
        .await;
        assert_eq!(result.unwrap_err().code, ErrorCode::InvalidRequest);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_is_conflict() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_retry("append workout", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TxError::Storage(sqlx::Error::PoolTimedOut)) }
        })
        .await;
        assert_eq!(result.unwrap_err().code, ErrorCode::Conflict);
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_retry_recovers() {
        let calls = AtomicU32::new(0);
        let result = with_retry("append workout", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(TxError::Storage(sqlx::Error::PoolTimedOut))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_terminal_storage_error_is_internal() {
        let result: AppResult<()> = with_retry("remove workout", || async {
            Err(TxError::Storage(sqlx::Error::RowNotFound))
        })
        .await;
        assert_eq!(result.unwrap_err().code, ErrorCode::InternalServerError);
    }
}
