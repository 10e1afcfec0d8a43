//! This modules defines the common functionality for paging data.

use serde::Deserialize;

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum number of items per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// The query parameters for a paginated request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// The 1-based page number.
    pub page: Option<u64>,
    /// The number of items per page.
    pub limit: Option<u64>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The 1-based page number.
    pub number: u64,
    /// The number of items per page, at least one.
    pub size: u64,
}

impl Page {
    /// Fill in missing values of `query` from `config` and validate the result.
    ///
    /// # Errors
    /// Returns [Error::InvalidPagination] if the page number or page size is zero.
    pub fn from_query(query: &PageQuery, config: &PaginationConfig) -> Result<Self, Error> {
        let number = query.page.unwrap_or(config.default_page);
        let size = query.limit.unwrap_or(config.default_page_size);

        if number == 0 {
            return Err(Error::InvalidPagination(
                "page must be at least 1".to_owned(),
            ));
        }

        if size == 0 {
            return Err(Error::InvalidPagination(
                "limit must be at least 1".to_owned(),
            ));
        }

        Ok(Self { number, size })
    }

    /// The number of items to skip before this page starts, clamped to what SQLite accepts.
    pub fn offset(&self) -> i64 {
        let offset = (self.number - 1).saturating_mul(self.size);
        i64::try_from(offset).unwrap_or(i64::MAX)
    }

    /// The page size, clamped to what SQLite accepts.
    pub fn limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }
}
