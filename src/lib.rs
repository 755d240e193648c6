// ABOUTME: Main library entry point for the Ironlog training API
// ABOUTME: Programs, workouts, scheduling, sessions with snapshots, and set logging over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

#![deny(unsafe_code)]

//! # Ironlog Server
//!
//! A personal strength-training backend. Users authenticate with an OIDC
//! bearer token and manage their own training programs, the ordered workouts
//! inside them, and the ordered exercises inside each workout. Workouts can be
//! scheduled on dates and started as sessions; a session freezes a snapshot of
//! the workout at start so later template edits never rewrite history. Sets are
//! logged against sessions and aggregated into lifted weight per day.
//!
//! ## Architecture
//!
//! - **routes**: thin axum handlers, one router per resource
//! - **services**: use-cases enforcing ownership and validation
//! - **authorization**: the program and workout ownership predicates
//! - **database**: `SQLite` managers, one per table, plus the ordered-collection
//!   protocol that keeps positions dense under concurrency
//! - **identity**: bearer token verification against a cached JWKS
//! - **snapshot**: the versioned document frozen into each session
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use ironlog_server::config::environment::ServerConfig;
//! use ironlog_server::database::Database;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let database = Database::new(&config.database.url, config.database.max_connections).await?;
//!     ironlog_server::server::run(config, database).await
//! }
//! ```

/// Ownership predicates over programs and workouts
pub mod authorization;

/// Environment configuration
pub mod config;

/// `SQLite` storage and the ordered-collection protocol
pub mod database;

/// Bearer token verification and the JWKS cache
pub mod identity;

/// Structured logging setup
pub mod logging;

/// Authentication, CORS, and request tracing middleware
pub mod middleware;

/// Shared per-server state
pub mod resources;

/// HTTP routes
pub mod routes;

/// Listener and graceful shutdown
pub mod server;

/// Use-cases behind the HTTP surface
pub mod services;

/// Versioned workout snapshot document
pub mod snapshot;

pub use ironlog_core::errors;
pub use ironlog_core::pagination;
