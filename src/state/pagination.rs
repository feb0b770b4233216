//! Page cursor for paged list views.

use crate::domain::Page;

/// Tracks a zero-based page index and a page size.
///
/// Every input is clamped, so the derived [`Page`] always satisfies
/// `offset == index * limit` with `limit >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    index: usize,
    page_size: usize,
}

impl PageCursor {
    /// Creates a cursor on page 0. A zero page size is raised to 1.
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self {
            index: 0,
            page_size: if page_size == 0 { 1 } else { page_size },
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Highest index whose offset still fits in a `usize`.
    const fn last_index(&self) -> usize {
        usize::MAX / self.page_size
    }

    /// Advances one page.
    pub fn next(&mut self) {
        self.index = self.index.saturating_add(1).min(self.last_index());
    }

    /// Goes back one page, stopping at page 0.
    pub fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Jumps to page `n`; negative targets land on page 0 and targets past
    /// the addressable range land on the last addressable page.
    pub fn go_to(&mut self, n: i64) {
        let target = usize::try_from(n.max(0)).unwrap_or(usize::MAX);
        self.index = target.min(self.last_index());
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Changes the page size and returns to page 0.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.index = 0;
    }

    /// Page parameters for the current position.
    #[must_use]
    pub const fn derive(&self) -> Page {
        Page {
            limit: self.page_size,
            offset: self.index * self.page_size,
        }
    }
}
