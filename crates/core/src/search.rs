//! Open-request search constants and pagination helpers.
//!
//! This module lives in `core` (zero internal deps) so both the repository
//! layer and the API handlers agree on the same window, bounds, and page
//! math.

use crate::error::CoreError;

/// Only requests created within this many days appear in search results.
pub const SEARCH_WINDOW_DAYS: i64 = 30;

/// Default number of results per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum number of results per page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Validated, 1-based pagination for search endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: i64,
    pub page_size: i64,
}

impl Page {
    /// Validate user-supplied pagination.
    ///
    /// `page < 1` or `page_size < 1` is a validation error; `page_size` is
    /// capped at [`MAX_PAGE_SIZE`] rather than rejected. Absent values take
    /// defaults.
    pub fn validate(page: Option<i64>, page_size: Option<i64>) -> Result<Self, CoreError> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page < 1 {
            return Err(CoreError::Validation("page must be >= 1".into()));
        }
        if page_size < 1 {
            return Err(CoreError::Validation("page_size must be >= 1".into()));
        }
        Ok(Page {
            page,
            page_size: page_size.min(MAX_PAGE_SIZE),
        })
    }

    /// SQL OFFSET for this page.
    pub fn offset(self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Total pages for a result count: ceil(total / page_size).
    pub fn total_pages(self, total: i64) -> i64 {
        if total == 0 {
            0
        } else {
            (total + self.page_size - 1) / self.page_size
        }
    }
}

/// Normalize a comma-separated category filter into lowercase terms.
///
/// Empty segments are dropped; an empty result means "no category filter".
pub fn normalize_categories(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}
