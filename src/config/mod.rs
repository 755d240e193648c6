// ABOUTME: Configuration module for server settings loaded from the environment
// ABOUTME: Re-exports the typed server configuration and its enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! Configuration for the Ironlog server
//!
//! All settings come from environment variables; see [`ServerConfig::from_env`].

/// Environment and server configuration
pub mod environment;

pub use environment::{
    DatabaseConfig, Environment, HttpConfig, IdentityConfig, LogLevel, ServerConfig,
};
