//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Query parameters for `GET /services/search`
/// (`?categories=a,b&page=1&page_size=20`).
///
/// `categories` is a comma-separated, case-insensitive filter; pagination is
/// 1-based and validated in `servia_core::search::Page`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub categories: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
