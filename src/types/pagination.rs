//! Page requests and results for `Repository::get_page`.
//!
//! Pages are numbered from 1. Page sizes are clamped to
//! `1..=MAX_PAGE_SIZE` so a request can never fetch an unbounded result.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Which page of a query to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginationParams {
    pub page: u64,
    pub per_page: u64,
}

impl PaginationParams {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Rows per page actually requested from the database
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }

    /// Zero-based page index; page 0 is read as the first page
    pub fn page_index(&self) -> u64 {
        self.page.saturating_sub(1)
    }

    /// Rows skipped before this page
    pub fn offset(&self) -> u64 {
        self.page_index() * self.limit()
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE)
    }
}

/// One page of records and where it sits in the full result.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    /// Rows matching the query across all pages
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, page: u64, per_page: u64, total: u64) -> Self {
        let total_pages = match per_page {
            0 => 0,
            size => total.div_ceil(size),
        };

        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
                total_pages,
            },
        }
    }

    /// Whether pages follow this one
    pub fn has_next(&self) -> bool {
        self.meta.page < self.meta.total_pages
    }
}
