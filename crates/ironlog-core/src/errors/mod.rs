// ABOUTME: Unified error type, wire error codes, and the JSON error envelope
// ABOUTME: Maps every domain failure to exactly one HTTP status and errorCode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! # Unified Error Handling System
//!
//! Every fallible operation in the workspace returns [`AppResult`]. An
//! [`AppError`] carries an [`ErrorCode`] that fixes both the HTTP status and the
//! `errorCode` string clients receive, plus a short human readable message.
//!
//! Internal failures (storage, serialization, unexpected states) keep their
//! detailed message for the logs only; the wire envelope carries the code's
//! generic description instead.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Storage error classification (`sqlx::Error` inspection)
#[cfg(feature = "database-errors")]
pub mod database;

/// Standard error codes exposed on the wire
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Missing or unverifiable credential
    #[serde(rename = "UNAUTHORIZED")]
    Unauthorized,
    /// Authenticated caller does not own the resource
    #[serde(rename = "FORBIDDEN")]
    Forbidden,
    /// Target entity is absent
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound,
    /// Identifier is not a valid UUID
    #[serde(rename = "INVALID_ID")]
    InvalidId,
    /// `page` is missing a valid value or is below 1
    #[serde(rename = "INVALID_PAGE_NUMBER")]
    InvalidPageNumber,
    /// `pageSize` is outside 1..=100
    #[serde(rename = "INVALID_PAGE_SIZE")]
    InvalidPageSize,
    /// A date is not in `YYYY-MM-DD` layout
    #[serde(rename = "INVALID_DATE_FORMAT")]
    InvalidDateFormat,
    /// A date range is empty or inverted
    #[serde(rename = "INVALID_DATE_RANGE")]
    InvalidDateRange,
    /// Request body or a domain rule is violated
    #[serde(rename = "INVALID_REQUEST")]
    InvalidRequest,
    /// Concurrent writers kept colliding and the operation gave up
    #[serde(rename = "CONFLICT")]
    Conflict,
    /// Unexpected failure
    #[serde(rename = "INTERNAL_SERVER_ERROR")]
    InternalServerError,
}

impl ErrorCode {
    /// HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::ResourceNotFound => 404,
            Self::InvalidId
            | Self::InvalidPageNumber
            | Self::InvalidPageSize
            | Self::InvalidDateFormat
            | Self::InvalidDateRange
            | Self::InvalidRequest => 400,
            Self::Conflict => 409,
            Self::InternalServerError => 500,
        }
    }

    /// User-facing description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Unauthorized => "Authentication is required to access this resource",
            Self::Forbidden => "You do not have permission to access this resource",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::InvalidId => "The provided identifier is not a valid UUID",
            Self::InvalidPageNumber => "page must be greater than 0",
            Self::InvalidPageSize => "pageSize must be between 1 and 100",
            Self::InvalidDateFormat => "Dates must use the YYYY-MM-DD format",
            Self::InvalidDateRange => "startDate must be before endDate",
            Self::InvalidRequest => "The request is invalid",
            Self::Conflict => "The resource was modified concurrently, please retry",
            Self::InternalServerError => "An internal server error occurred",
        }
    }

    /// Wire name of this code (`RESOURCE_NOT_FOUND`, ...)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::InvalidId => "INVALID_ID",
            Self::InvalidPageNumber => "INVALID_PAGE_NUMBER",
            Self::InvalidPageSize => "INVALID_PAGE_SIZE",
            Self::InvalidDateFormat => "INVALID_DATE_FORMAT",
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::Conflict => "CONFLICT",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Whether the code describes a server-side failure
    #[must_use]
    pub const fn is_server_error(self) -> bool {
        self.http_status() >= 500
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the application
#[derive(Debug, thiserror::Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Structured details kept for logs
    pub details: Option<Value>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Attach structured details
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Message safe to send to clients
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.code.is_server_error() {
            self.code.description().to_owned()
        } else {
            self.message.clone()
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors for the error taxonomy
impl AppError {
    /// Missing or unverifiable credential
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Caller does not own the resource
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Resource not found, `resource` names the missing thing
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Identifier is not a UUID; `field` names the offending parameter
    pub fn invalid_id(field: &str) -> Self {
        Self::new(
            ErrorCode::InvalidId,
            format!("{field} is not a valid UUID"),
        )
    }

    /// `page` below 1 or unparseable
    #[must_use]
    pub fn invalid_page_number() -> Self {
        Self::new(
            ErrorCode::InvalidPageNumber,
            ErrorCode::InvalidPageNumber.description(),
        )
    }

    /// `pageSize` outside the accepted range or unparseable
    #[must_use]
    pub fn invalid_page_size() -> Self {
        Self::new(
            ErrorCode::InvalidPageSize,
            ErrorCode::InvalidPageSize.description(),
        )
    }

    /// A date field does not follow `YYYY-MM-DD`
    pub fn invalid_date_format(field: &str) -> Self {
        Self::new(
            ErrorCode::InvalidDateFormat,
            format!("Invalid {field} format, expected YYYY-MM-DD"),
        )
    }

    /// Inverted or empty date range
    pub fn invalid_date_range(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidDateRange, message)
    }

    /// Request body or domain rule violation
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Reorder target outside `1..=count`
    #[must_use]
    pub fn invalid_position(requested: i64, count: i64) -> Self {
        Self::new(
            ErrorCode::InvalidRequest,
            format!("position must be between 1 and {count}"),
        )
        .with_details(serde_json::json!({
            "requested": requested,
            "count": count,
        }))
    }

    /// Retries exhausted on a contended write
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalServerError, message)
    }

    /// Storage failure; the message keeps the operation context for logs
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalServerError, message)
            .with_details(serde_json::json!({ "layer": "database" }))
    }
}

/// HTTP error response envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Wire error code
    pub error_code: ErrorCode,
    /// Short human-readable message
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(error: &AppError) -> Self {
        Self {
            error_code: error.code,
            message: error.public_message(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization failed: {error}"))
    }
}

#[cfg(feature = "http-response")]
mod http_response {
    use axum::extract::rejection::{JsonRejection, QueryRejection};
    use axum::response::{IntoResponse, Response};
    use axum::Json;
    use http::StatusCode;

    use super::{AppError, ErrorResponse};

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = StatusCode::from_u16(self.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

            if self.code.is_server_error() {
                tracing::error!(
                    error.code = %self.code,
                    error.details = ?self.details,
                    "{}",
                    self.message
                );
            } else {
                tracing::debug!(error.code = %self.code, "{}", self.message);
            }

            (status, Json(ErrorResponse::from(&self))).into_response()
        }
    }

    impl From<JsonRejection> for AppError {
        fn from(rejection: JsonRejection) -> Self {
            Self::invalid_request(format!("Invalid JSON body: {}", rejection.body_text()))
        }
    }

    impl From<QueryRejection> for AppError {
        fn from(rejection: QueryRejection) -> Self {
            Self::invalid_request(format!("Invalid query string: {}", rejection.body_text()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::Unauthorized.http_status(), 401);
        assert_eq!(ErrorCode::Forbidden.http_status(), 403);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::InvalidDateRange.http_status(), 400);
        assert_eq!(ErrorCode::Conflict.http_status(), 409);
        assert_eq!(ErrorCode::InternalServerError.http_status(), 500);
    }

    #[test]
    fn test_error_code_wire_names_match_serde() {
        for code in [
            ErrorCode::Unauthorized,
            ErrorCode::InvalidPageSize,
            ErrorCode::InvalidDateFormat,
            ErrorCode::InternalServerError,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_invalid_position_message() {
        let error = AppError::invalid_position(5, 3);
        assert_eq!(error.code, ErrorCode::InvalidRequest);
        assert_eq!(error.message, "position must be between 1 and 3");
        assert_eq!(error.details.unwrap()["requested"], 5);
    }

    #[test]
    fn test_envelope_hides_internal_messages() {
        let error = AppError::database("Failed to insert workout: UNIQUE constraint failed");
        let envelope = ErrorResponse::from(&error);
        assert_eq!(envelope.error_code, ErrorCode::InternalServerError);
        assert!(!envelope.message.contains("UNIQUE"));

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["errorCode"], "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn test_envelope_keeps_client_messages() {
        let error = AppError::not_found("Workout");
        let envelope = ErrorResponse::from(&error);
        assert_eq!(envelope.message, "Workout not found");
    }
}
