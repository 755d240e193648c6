// ABOUTME: Classification of sqlx errors into retryable and terminal storage failures
// ABOUTME: Lets transactional writers decide between retrying, conflict, and internal error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use sqlx::error::ErrorKind;

use super::AppError;

/// Coarse classification of a storage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFailure {
    /// A unique index rejected the write (lost a race on a position slot)
    UniqueViolation,
    /// The database was busy or locked by another writer
    Contention,
    /// A referenced row does not exist
    ForeignKeyViolation,
    /// The query returned no row where one was required
    RowNotFound,
    /// Anything else
    Other,
}

impl StorageFailure {
    /// Whether a fresh attempt of the whole transaction may succeed
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::UniqueViolation | Self::Contention)
    }
}

/// SQLite primary/extended result codes and `PostgreSQL` SQLSTATEs meaning "try again"
const CONTENTION_CODES: &[&str] = &[
    "5",     // SQLITE_BUSY
    "6",     // SQLITE_LOCKED
    "261",   // SQLITE_BUSY_RECOVERY
    "262",   // SQLITE_LOCKED_SHAREDCACHE
    "517",   // SQLITE_BUSY_SNAPSHOT
    "40001", // serialization_failure
    "40P01", // deadlock_detected
];

/// Classify a `sqlx` error
#[must_use]
pub fn classify(error: &sqlx::Error) -> StorageFailure {
    match error {
        sqlx::Error::RowNotFound => StorageFailure::RowNotFound,
        sqlx::Error::PoolTimedOut => StorageFailure::Contention,
        sqlx::Error::Database(db_error) => match db_error.kind() {
            ErrorKind::UniqueViolation => StorageFailure::UniqueViolation,
            ErrorKind::ForeignKeyViolation => StorageFailure::ForeignKeyViolation,
            _ => {
                let contended = db_error
                    .code()
                    .is_some_and(|code| CONTENTION_CODES.contains(&&*code))
                    || db_error.message().contains("database is locked");
                if contended {
                    StorageFailure::Contention
                } else {
                    StorageFailure::Other
                }
            }
        },
        _ => StorageFailure::Other,
    }
}

/// Wrap a `sqlx` error with operation context
///
/// `operation` reads as a verb phrase, e.g. `"insert workout"`.
#[must_use]
pub fn storage_error(operation: &str, error: &sqlx::Error) -> AppError {
    match classify(error) {
        StorageFailure::ForeignKeyViolation => {
            AppError::invalid_request(format!("Failed to {operation}: referenced entity missing"))
        }
        _ => AppError::database(format!("Failed to {operation}: {error}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_terminal() {
        let failure = classify(&sqlx::Error::RowNotFound);
        assert_eq!(failure, StorageFailure::RowNotFound);
        assert!(!failure.is_retryable());
    }

    #[test]
    fn test_pool_timeout_is_retryable() {
        assert!(classify(&sqlx::Error::PoolTimedOut).is_retryable());
    }

    #[test]
    fn test_storage_error_keeps_context() {
        let error = storage_error("insert workout", &sqlx::Error::RowNotFound);
        assert!(error.message.starts_with("Failed to insert workout"));
        assert!(error.code.is_server_error());
    }
}
