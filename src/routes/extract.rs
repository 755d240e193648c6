// ABOUTME: Request extraction helpers that report failures in the JSON error envelope
// ABOUTME: JSON body and query wrappers plus UUID, page, and date parameter parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use axum::extract::{FromRequest, FromRequestParts};
use ironlog_core::errors::{AppError, AppResult};
use ironlog_core::pagination::PageRequest;
use serde::Deserialize;
use uuid::Uuid;

/// `Json` whose rejection is an `INVALID_REQUEST` envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// `Query` whose rejection is an `INVALID_REQUEST` envelope
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct QueryParams<T>(pub T);

/// `page` and `pageSize`, kept as text so bad values map to their own codes
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// One-based page number
    pub page: Option<String>,
    /// Items per page
    pub page_size: Option<String>,
}

impl PageQuery {
    /// Validate into a page request
    ///
    /// # Errors
    ///
    /// Returns `INVALID_PAGE_NUMBER` or `INVALID_PAGE_SIZE`
    pub fn page_request(&self) -> AppResult<PageRequest> {
        PageRequest::from_query(self.page.as_deref(), self.page_size.as_deref())
    }
}

/// Parse a required UUID parameter
///
/// # Errors
///
/// Returns `INVALID_ID` when `raw` is not a UUID
pub fn parse_id(field: &str, raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::invalid_id(field))
}

/// Parse an optional UUID parameter; blank means absent
///
/// # Errors
///
/// Returns `INVALID_ID` when a non-blank value is not a UUID
pub fn parse_optional_id(field: &str, raw: Option<&str>) -> AppResult<Option<Uuid>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_id(field, value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironlog_core::errors::ErrorCode;

    #[test]
    fn test_id_parsing() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id("id", &id.to_string()).unwrap(), id);
        assert_eq!(
            parse_id("id", "not-a-uuid").unwrap_err().code,
            ErrorCode::InvalidId
        );
        assert_eq!(parse_optional_id("workoutId", Some("  ")).unwrap(), None);
        assert_eq!(parse_optional_id("workoutId", None).unwrap(), None);
    }

    #[test]
    fn test_page_query_defaults() {
        let request = PageQuery::default().page_request().unwrap();
        assert_eq!(request.page(), 1);
        assert_eq!(request.page_size(), 10);
    }
}
