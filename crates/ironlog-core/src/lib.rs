// ABOUTME: Core types and constants for the Ironlog training API
// ABOUTME: Foundation crate with error handling, page pagination, date codec, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

#![deny(unsafe_code)]

//! # Ironlog Core
//!
//! Foundation crate providing shared types for the Ironlog training API. It is
//! kept free of storage and transport code so the server crate can depend on
//! it without pulling the HTTP stack into every consumer.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode` and the wire error envelope
//! - **pagination**: page-number pagination with a totals envelope
//! - **dates**: the `YYYY-MM-DD` calendar date codec used on the wire
//! - **constants**: limits and defaults shared across the workspace

/// Unified error handling system with wire error codes and HTTP responses
pub mod errors;

/// Page-number pagination request validation and response envelope
pub mod pagination;

/// Calendar date parsing and formatting for the wire format
pub mod dates;

/// Application constants organized by domain
pub mod constants;
