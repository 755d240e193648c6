// ABOUTME: Calendar date codec for the YYYY-MM-DD wire format
// ABOUTME: Parses query and body dates and validates inclusive and half-open ranges
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::errors::{AppError, AppResult};

/// Layout of every calendar date on the wire and in storage
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` value; `field` names the parameter in the error
///
/// # Errors
///
/// Returns `INVALID_DATE_FORMAT` when the value does not parse
pub fn parse_date(field: &str, raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| AppError::invalid_date_format(field))
}

/// Parse an optional query value, treating blank as absent
///
/// # Errors
///
/// Returns `INVALID_DATE_FORMAT` when a present value does not parse
pub fn parse_optional_date(field: &str, raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(field, value).map(Some),
    }
}

/// Format a date for the wire
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format an instant the way it is stored and returned (RFC 3339, UTC, microseconds)
#[must_use]
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored RFC 3339 instant
///
/// # Errors
///
/// Returns an internal error when the stored text is corrupt
pub fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid stored timestamp '{raw}': {e}")))
}

/// Require `start < end` when both bounds are present
///
/// # Errors
///
/// Returns `INVALID_DATE_RANGE` for an empty or inverted range
pub fn ensure_strict_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(AppError::invalid_date_range(
                "startDate must be before endDate",
            ));
        }
    }
    Ok(())
}

/// Require `start <= end`; a single-day range is allowed
///
/// # Errors
///
/// Returns `INVALID_DATE_RANGE` when the range is inverted
pub fn ensure_inclusive_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if start > end {
        return Err(AppError::invalid_date_range(
            "startDate must not be after endDate",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_parse_date() {
        let date = parse_date("date", "2025-03-09").unwrap();
        assert_eq!(format_date(date), "2025-03-09");

        let error = parse_date("startDate", "09/03/2025").unwrap_err();
        assert_eq!(error.code, ErrorCode::InvalidDateFormat);
        assert!(error.message.contains("startDate"));

        assert_eq!(
            parse_date("date", "2025-02-30").unwrap_err().code,
            ErrorCode::InvalidDateFormat
        );
    }

    #[test]
    fn test_optional_blank_is_absent() {
        assert_eq!(parse_optional_date("endDate", Some("  ")).unwrap(), None);
        assert_eq!(parse_optional_date("endDate", None).unwrap(), None);
    }

    #[test]
    fn test_ranges() {
        let day = parse_date("d", "2025-01-01").unwrap();
        let next = parse_date("d", "2025-01-02").unwrap();

        assert!(ensure_strict_range(Some(day), Some(next)).is_ok());
        assert!(ensure_strict_range(Some(day), None).is_ok());
        assert_eq!(
            ensure_strict_range(Some(day), Some(day)).unwrap_err().code,
            ErrorCode::InvalidDateRange
        );

        assert!(ensure_inclusive_range(day, day).is_ok());
        assert_eq!(
            ensure_inclusive_range(next, day).unwrap_err().code,
            ErrorCode::InvalidDateRange
        );
    }

    #[test]
    fn test_timestamp_round_trip_keeps_order() {
        let earlier = parse_timestamp("2025-01-01T10:00:00.000001Z").unwrap();
        let later = parse_timestamp("2025-01-01T10:00:00.000010Z").unwrap();
        assert!(format_timestamp(earlier) < format_timestamp(later));
    }
}
