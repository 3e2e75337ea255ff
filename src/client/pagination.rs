//! Page math over `limit`/`offset` list endpoints.

use crate::models::PageMeta;
use crate::models::query::{DEFAULT_LIMIT, MAX_LIMIT};

/// Highest page whose offset still fits a signed 64-bit query parameter.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

/// One-based page position with a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_LIMIT)
    }
}

impl Pagination {
    /// Page is kept within 1..=MAX_PAGE; page size within 1..=100.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            page_size: page_size.clamp(1, MAX_LIMIT),
        }
    }

    /// Position described by a list response's meta.
    pub fn from_meta(meta: &PageMeta) -> Self {
        let size = meta.limit.clamp(1, MAX_LIMIT);
        Self::new((meta.offset / size).saturating_add(1), size)
    }

    pub fn limit(&self) -> u64 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size).max(1)
    }

    pub fn has_next(&self, total: u64) -> bool {
        self.page < self.total_pages(total)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn next(&self) -> Self {
        Self::new(self.page.saturating_add(1), self.page_size)
    }

    pub fn previous(&self) -> Self {
        Self::new(self.page.saturating_sub(1), self.page_size)
    }

    /// Pull the page back inside range after the total shrank.
    pub fn clamp(&self, total: u64) -> Self {
        Self::new(self.page.min(self.total_pages(total)), self.page_size)
    }
}
