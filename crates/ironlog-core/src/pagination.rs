// ABOUTME: Page-number pagination for list endpoints
// ABOUTME: Validates page/pageSize query input and builds the totals envelope
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use serde::{Deserialize, Serialize};

use crate::constants::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult};

/// Validated page selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Create a page request, rejecting `page < 1` and `pageSize` outside `1..=100`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_PAGE_NUMBER` or `INVALID_PAGE_SIZE`
    pub fn new(page: i64, page_size: i64) -> AppResult<Self> {
        if page < 1 {
            return Err(AppError::invalid_page_number());
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::invalid_page_size());
        }
        Ok(Self { page, page_size })
    }

    /// Parse raw query values; absent values fall back to the defaults
    ///
    /// # Errors
    ///
    /// Returns `INVALID_PAGE_NUMBER` or `INVALID_PAGE_SIZE` when a value is
    /// present but not an integer in range
    pub fn from_query(page: Option<&str>, page_size: Option<&str>) -> AppResult<Self> {
        let page = match page.map(str::trim) {
            None | Some("") => DEFAULT_PAGE,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::invalid_page_number())?,
        };
        let page_size = match page_size.map(str::trim) {
            None | Some("") => DEFAULT_PAGE_SIZE,
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| AppError::invalid_page_size())?,
        };
        Self::new(page, page_size)
    }

    /// One-based page number
    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    /// Items per page
    #[must_use]
    pub const fn page_size(&self) -> i64 {
        self.page_size
    }

    /// SQL `LIMIT`
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.page_size
    }

    /// SQL `OFFSET`, saturating so absurd page numbers read as an empty page
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Number of pages needed for `total_items` at `page_size`
#[must_use]
pub const fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total_items <= 0 {
        0
    } else {
        (total_items + page_size - 1) / page_size
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items across all pages
    pub total_items: i64,
    /// One-based page number of this page
    pub current_page: i64,
    /// Requested page size
    pub page_size: i64,
    /// Number of pages for the current total
    pub total_pages: i64,
    /// The items in this page
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Assemble a page from a query result and its total count
    #[must_use]
    pub fn new(items: Vec<T>, total_items: i64, request: PageRequest) -> Self {
        Self {
            total_items,
            current_page: request.page(),
            page_size: request.page_size(),
            total_pages: total_pages(total_items, request.page_size()),
            items,
        }
    }

    /// Convert every item, keeping the pagination metadata
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            total_items: self.total_items,
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            items: self.items.into_iter().map(f).collect(),
        }
    }

    /// Convert every item with a fallible function, stopping at the first error
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `f`
    pub fn try_map<U, E, F>(self, f: F) -> Result<Page<U>, E>
    where
        F: FnMut(T) -> Result<U, E>,
    {
        Ok(Page {
            total_items: self.total_items,
            current_page: self.current_page,
            page_size: self.page_size,
            total_pages: self.total_pages,
            items: self.items.into_iter().map(f).collect::<Result<Vec<_>, E>>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_bounds() {
        assert!(PageRequest::new(1, 1).is_ok());
        assert!(PageRequest::new(1, 100).is_ok());
        assert_eq!(
            PageRequest::new(0, 10).unwrap_err().code,
            ErrorCode::InvalidPageNumber
        );
        assert_eq!(
            PageRequest::new(1, 0).unwrap_err().code,
            ErrorCode::InvalidPageSize
        );
        assert_eq!(
            PageRequest::new(1, 101).unwrap_err().code,
            ErrorCode::InvalidPageSize
        );
    }

    #[test]
    fn test_from_query_defaults_and_garbage() {
        let request = PageRequest::from_query(None, None).unwrap();
        assert_eq!(request, PageRequest::default());

        let request = PageRequest::from_query(Some("3"), Some("20")).unwrap();
        assert_eq!(request.offset(), 40);
        assert_eq!(request.limit(), 20);

        assert_eq!(
            PageRequest::from_query(Some("two"), None).unwrap_err().code,
            ErrorCode::InvalidPageNumber
        );
        assert_eq!(
            PageRequest::from_query(None, Some("-5")).unwrap_err().code,
            ErrorCode::InvalidPageSize
        );
    }

    #[test]
    fn test_offset_saturates_for_huge_page_numbers() {
        let request = PageRequest::from_query(Some("9223372036854775807"), Some("100")).unwrap();
        assert_eq!(request.page(), i64::MAX);
        assert_eq!(request.offset(), i64::MAX);

        let request = PageRequest::new(i64::MAX / 50, 100).unwrap();
        assert_eq!(request.offset(), i64::MAX);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
    }

    #[test]
    fn test_envelope_shape() {
        let page = Page::new(vec![1, 2], 7, PageRequest::new(2, 2).unwrap());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalItems"], 7);
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["pageSize"], 2);
        assert_eq!(json["totalPages"], 4);
        assert_eq!(json["items"].as_array().unwrap().len(), 2);
    }
}
