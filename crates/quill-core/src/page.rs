//! Pagination types shared by repositories and handlers.

/// A validated page request. Pages are 1-based; out-of-range values are
/// clamped rather than rejected so clients never see pagination errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Cap the page size at `max`.
    pub fn clamp_per_page(self, max: u64) -> Self {
        Self {
            page: self.page,
            per_page: self.per_page.min(max.max(1)),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Zero-based page index, for offset-style backends.
    pub fn zero_based(&self) -> u64 {
        self.page - 1
    }
}

/// One page of results together with the totals needed to render
/// pagination controls.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64, total_pages: u64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total_items,
            total_pages,
        }
    }

    /// Map the items, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_becomes_first() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page(), 1);
        assert_eq!(req.per_page(), 1);
        assert_eq!(req.zero_based(), 0);
    }

    #[test]
    fn per_page_is_capped() {
        let req = PageRequest::new(2, 500).clamp_per_page(100);
        assert_eq!(req.per_page(), 100);
        assert_eq!(req.page(), 2);
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(2, 3), 7, 3);
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.items, vec!["1", "2", "3"]);
        assert_eq!(mapped.page, 2);
        assert_eq!(mapped.total_items, 7);
        assert_eq!(mapped.total_pages, 3);
    }
}
