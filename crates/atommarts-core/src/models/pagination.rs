use serde::{Deserialize, Serialize};

/// Page cursor for a server-paginated table. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
}

impl Pagination {
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            total_items: 0,
        }
    }

    /// `ceil(total_items / per_page)`; zero when the table is empty.
    pub fn total_pages(&self) -> u32 {
        let per_page = u64::from(self.per_page.max(1));
        self.total_items.div_ceil(per_page) as u32
    }

    /// Move to `page` if it exists. Returns whether the page changed.
    pub fn go_to(&mut self, page: u32) -> bool {
        if page >= 1 && page <= self.total_pages() && page != self.page {
            self.page = page;
            true
        } else {
            false
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.page + 1)
    }

    pub fn previous(&mut self) -> bool {
        self.page > 1 && self.go_to(self.page - 1)
    }

    /// Record a new total and pull the cursor back if it fell off the end.
    pub fn set_total(&mut self, total_items: u64) {
        self.total_items = total_items;
        let last = self.total_pages().max(1);
        if self.page > last {
            self.page = last;
        }
    }

    /// Go back to the first page, as when a filter or search changes.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// "Page 2 of 5"
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages().max(1))
    }
}
