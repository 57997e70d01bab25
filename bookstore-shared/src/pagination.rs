//! Page-based pagination used by list and search operations.

use serde::{Deserialize, Serialize};

/// Number of rows per page when the caller does not ask for another size.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A request for one page of results. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Request page `page` with the default page size. Page `0` is treated
    /// as the first page.
    pub fn page(page: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// SQL `LIMIT` for this page.
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size.max(1))
    }

    /// SQL `OFFSET` for this page, clamped to `i64::MAX`.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1).saturating_mul(self.limit())
    }
}

/// One page of results together with the total number of matching rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page.max(1),
            page_size: request.page_size.max(1),
            total,
        }
    }

    /// Number of pages needed to cover `total`.
    pub fn page_count(&self) -> u64 {
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.page_count()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
        }
    }
}
