// ABOUTME: HTTP middleware for authentication, CORS, and request correlation
// ABOUTME: Provides the profile authenticator, CORS layer, and request-id tracing helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

pub mod auth;
pub mod cors;
pub mod tracing;

// Authentication
pub use auth::{AuthenticatedProfile, ProfileAuthenticator};

// CORS configuration
pub use cors::setup_cors;

// Request correlation
pub use self::tracing::{create_request_span, request_id_middleware, RequestId, REQUEST_ID_HEADER};
