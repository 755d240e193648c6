// ABOUTME: SQLite persistence layer: connection setup, schema migrations, and table managers
// ABOUTME: Every read filters soft-deleted rows; position writes go through the positions module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! # Database
//!
//! [`Database`] owns the `sqlx` pool and hands out one manager per table.
//! Managers are cheap to construct (they clone the pool handle) and never
//! check ownership; that is the job of
//! [`AuthorizationService`](crate::authorization::AuthorizationService).

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use ironlog_core::dates::format_timestamp;
use ironlog_core::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// Exercise catalog
pub mod exercises;
/// Per-set exercise logs and the weight-per-day aggregate
pub mod exercise_logs;
/// Dense 1..N ordering of workouts and workout-exercises
pub mod positions;
/// Profiles keyed by identity-provider subject
pub mod profiles;
/// Training programs
pub mod programs;
/// Planned workout occurrences
pub mod scheduled;
/// Workout sessions and their snapshots
pub mod sessions;
/// Per-profile settings
pub mod settings;
/// Exercises prescribed inside a workout
pub mod workout_exercises;
/// Workouts within a training program
pub mod workouts;

pub use exercise_logs::ExerciseLogsManager;
pub use exercises::ExercisesManager;
pub use profiles::ProfilesManager;
pub use programs::ProgramsManager;
pub use scheduled::ScheduledWorkoutsManager;
pub use sessions::SessionsManager;
pub use settings::SettingsManager;
pub use workout_exercises::WorkoutExercisesManager;
pub use workouts::WorkoutsManager;

/// How long a connection waits on a locked database before `SQLITE_BUSY`
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database handle shared by all request handlers
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and run migrations
    ///
    /// In-memory URLs get a single long-lived connection so every query sees
    /// the same database.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is malformed, the connection fails, or a
    /// migration fails
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {database_url}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT)
            .foreign_keys(true);

        if !in_memory {
            ensure_parent_dir(options.get_filename())?;
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to {database_url}"))?;

        let db = Self { pool };
        db.migrate().await?;

        info!(in_memory, "Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Round-trip a trivial query
    ///
    /// # Errors
    ///
    /// Returns an internal error if the database does not answer
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to ping database: {e}")))?;
        Ok(())
    }

    /// Profile manager
    #[must_use]
    pub fn profiles(&self) -> ProfilesManager {
        ProfilesManager::new(self.pool.clone())
    }

    /// Settings manager
    #[must_use]
    pub fn settings(&self) -> SettingsManager {
        SettingsManager::new(self.pool.clone())
    }

    /// Exercise catalog manager
    #[must_use]
    pub fn exercises(&self) -> ExercisesManager {
        ExercisesManager::new(self.pool.clone())
    }

    /// Training program manager
    #[must_use]
    pub fn programs(&self) -> ProgramsManager {
        ProgramsManager::new(self.pool.clone())
    }

    /// Workout manager
    #[must_use]
    pub fn workouts(&self) -> WorkoutsManager {
        WorkoutsManager::new(self.pool.clone())
    }

    /// Workout-exercise manager
    #[must_use]
    pub fn workout_exercises(&self) -> WorkoutExercisesManager {
        WorkoutExercisesManager::new(self.pool.clone())
    }

    /// Scheduled workout manager
    #[must_use]
    pub fn scheduled(&self) -> ScheduledWorkoutsManager {
        ScheduledWorkoutsManager::new(self.pool.clone())
    }

    /// Session manager
    #[must_use]
    pub fn sessions(&self) -> SessionsManager {
        SessionsManager::new(self.pool.clone())
    }

    /// Exercise log manager
    #[must_use]
    pub fn exercise_logs(&self) -> ExerciseLogsManager {
        ExerciseLogsManager::new(self.pool.clone())
    }

    /// Create every table and index
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_profiles().await?;
        self.migrate_catalog().await?;
        self.migrate_programs().await?;
        self.migrate_sessions().await?;
        debug!("Schema migrations applied");
        Ok(())
    }

    async fn run_ddl(&self, statements: &[&str]) -> Result<()> {
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Migration failed: {}", statement.trim()))?;
        }
        Ok(())
    }

    async fn migrate_profiles(&self) -> Result<()> {
        self.run_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS profiles (
                id TEXT PRIMARY KEY,
                external_id TEXT NOT NULL UNIQUE,
                sex TEXT CHECK (sex IN ('male', 'female')),
                birthday TEXT,
                weight REAL,
                height REAL,
                avatar_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS settings (
                id TEXT PRIMARY KEY,
                profile_id TEXT NOT NULL UNIQUE REFERENCES profiles(id),
                language TEXT NOT NULL DEFAULT 'en',
                measurement_units TEXT NOT NULL DEFAULT 'metric'
                    CHECK (measurement_units IN ('metric', 'imperial')),
                timezone TEXT NOT NULL DEFAULT 'UTC',
                notifications_enabled INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
        ])
        .await
    }

    async fn migrate_catalog(&self) -> Result<()> {
        self.run_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL CHECK (length(name) > 0),
                primary_muscle TEXT NOT NULL CHECK (length(primary_muscle) > 0),
                secondary_muscles TEXT NOT NULL DEFAULT '[]',
                equipment TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_exercises_name ON exercises(name)",
            "CREATE INDEX IF NOT EXISTS idx_exercises_primary_muscle ON exercises(primary_muscle COLLATE NOCASE)",
        ])
        .await
    }

    async fn migrate_programs(&self) -> Result<()> {
        self.run_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS training_programs (
                id TEXT PRIMARY KEY,
                profile_id TEXT NOT NULL REFERENCES profiles(id),
                name TEXT NOT NULL CHECK (length(name) > 0),
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_training_programs_profile ON training_programs(profile_id)",
            r"
            CREATE TABLE IF NOT EXISTS workouts (
                id TEXT PRIMARY KEY,
                training_program_id TEXT NOT NULL REFERENCES training_programs(id),
                name TEXT NOT NULL,
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_workouts_live_position
                ON workouts(training_program_id, position)
                WHERE deleted_at IS NULL
            ",
            r"
            CREATE TABLE IF NOT EXISTS workout_exercises (
                id TEXT PRIMARY KEY,
                workout_id TEXT NOT NULL REFERENCES workouts(id),
                exercise_id TEXT NOT NULL REFERENCES exercises(id),
                sets INTEGER NOT NULL CHECK (sets >= 1),
                reps INTEGER NOT NULL CHECK (reps >= 1),
                position INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_workout_exercises_live_position
                ON workout_exercises(workout_id, position)
                WHERE deleted_at IS NULL
            ",
            r"
            CREATE TABLE IF NOT EXISTS scheduled_workouts (
                id TEXT PRIMARY KEY,
                profile_id TEXT NOT NULL REFERENCES profiles(id),
                workout_id TEXT NOT NULL REFERENCES workouts(id),
                date TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_scheduled_workouts_profile_date ON scheduled_workouts(profile_id, date)",
        ])
        .await
    }

    async fn migrate_sessions(&self) -> Result<()> {
        self.run_ddl(&[
            r"
            CREATE TABLE IF NOT EXISTS workout_sessions (
                id TEXT PRIMARY KEY,
                profile_id TEXT NOT NULL REFERENCES profiles(id),
                workout_id TEXT NOT NULL REFERENCES workouts(id),
                snapshot TEXT NOT NULL,
                started_at TEXT NOT NULL,
                completed_at TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_workout_sessions_profile_started ON workout_sessions(profile_id, started_at)",
            r"
            CREATE TABLE IF NOT EXISTS exercise_logs (
                id TEXT PRIMARY KEY,
                profile_id TEXT NOT NULL REFERENCES profiles(id),
                workout_session_id TEXT NOT NULL REFERENCES workout_sessions(id),
                exercise_id TEXT NOT NULL REFERENCES exercises(id),
                set_number INTEGER NOT NULL CHECK (set_number >= 1),
                reps_completed INTEGER NOT NULL CHECK (reps_completed >= 0),
                weight_used REAL NOT NULL CHECK (weight_used >= 0),
                logged_at TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_exercise_logs_profile_logged ON exercise_logs(profile_id, logged_at)",
            "CREATE INDEX IF NOT EXISTS idx_exercise_logs_session ON exercise_logs(workout_session_id)",
            "CREATE INDEX IF NOT EXISTS idx_exercise_logs_exercise ON exercise_logs(profile_id, exercise_id, logged_at)",
        ])
        .await
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Current instant in storage format
pub(crate) fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Parse a stored UUID column
pub(crate) fn parse_uuid(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| AppError::internal(format!("Invalid stored UUID '{raw}': {e}")))
}
