//! Client-side pagination of the filtered grid.
//!
//! Two pagination layers exist: the backend pages the raw catalog, and this
//! paginator re-pages whatever survived filtering of the current server
//! page. Changing any filter resets this layer to page 1.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 12;

/// Position within the filtered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginator {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Paginator {
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Number of pages for `len` items; at least 1 so an empty grid still
    /// renders page 1 of 1.
    #[must_use]
    pub fn total_pages(&self, len: usize) -> u32 {
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        len.div_ceil(self.per_page).max(1)
    }

    /// The slice of `items` visible on the current page.
    ///
    /// A page past the end yields an empty slice rather than panicking; the
    /// caller clamps via [`Self::clamped`] when it wants the last page
    /// instead.
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let per_page = self.per_page as usize;
        let start = (self.page.saturating_sub(1) as usize).saturating_mul(per_page);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(per_page).min(items.len());
        &items[start..end]
    }

    /// This paginator with the page clamped into `[1, total_pages]`.
    #[must_use]
    pub fn clamped(self, len: usize) -> Self {
        Self {
            page: self.page.clamp(1, self.total_pages(len)),
            per_page: self.per_page,
        }
    }

    /// Back to page 1 (after any filter change).
    #[must_use]
    pub fn reset(self) -> Self {
        Self {
            page: 1,
            per_page: self.per_page,
        }
    }
}
