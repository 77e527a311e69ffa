//! Pagination

use std::ops::Range;

/// 1-based page selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self { page, page_size }
    }

    /// Number of pages for `total` rows; at least one page even when empty
    pub fn page_count(&self, total: usize) -> usize {
        if self.page_size == 0 {
            return 1;
        }
        total.div_ceil(self.page_size).max(1)
    }

    /// The page actually shown: requested page clamped to `[1, page_count]`
    pub fn effective_page(&self, total: usize) -> usize {
        self.page.clamp(1, self.page_count(total))
    }

    /// Index range of the effective page within `total` rows
    pub fn slice(&self, total: usize) -> Range<usize> {
        if self.page_size == 0 {
            return 0..total;
        }
        let start = (self.effective_page(total) - 1)
            .saturating_mul(self.page_size)
            .min(total);
        let end = start.saturating_add(self.page_size).min(total);
        start..end
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}
