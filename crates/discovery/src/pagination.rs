//! Offset pagination shared by search results and view history.

use serde::{Deserialize, Serialize};

/// A validated page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Callers validate bounds before constructing a request.
    pub(crate) const fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    pub const fn page(self) -> u32 {
        self.page
    }

    pub const fn per_page(self) -> u32 {
        self.per_page
    }

    /// Number of items skipped before this page: `(page - 1) * per_page`.
    pub fn offset(self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// Pagination block returned alongside every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Builds the block for `request` given the exact number of matching items.
    pub fn new(request: PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(u64::from(request.per_page.max(1)));

        Self {
            current_page: request.page,
            total_pages,
            total_items,
            items_per_page: request.per_page,
            has_next_page: u64::from(request.page) < total_pages,
            has_prev_page: request.page > 1,
        }
    }

    /// A single page holding every returned item.
    pub fn single(per_page: u32, total_items: u64) -> Self {
        Self::new(PageRequest::new(1, per_page), total_items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(PageRequest::new(1, 20).offset(), 0);
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn total_pages_is_ceiling_of_items_over_page_size() {
        for per_page in [1_u32, 3, 7, 20, 100] {
            for total in [0_u64, 1, 2, 19, 20, 21, 99, 100, 101, 1_000] {
                for page in [1_u32, 2, 5, 50] {
                    let pagination = Pagination::new(PageRequest::new(page, per_page), total);
                    let expected_pages = total.div_ceil(u64::from(per_page));

                    assert_eq!(
                        pagination.total_pages, expected_pages,
                        "total={total} per_page={per_page}"
                    );
                    assert_eq!(
                        pagination.has_next_page,
                        u64::from(page) < expected_pages,
                        "page={page} total={total} per_page={per_page}"
                    );
                    assert_eq!(pagination.has_prev_page, page > 1, "page={page}");
                }
            }
        }
    }

    #[test]
    fn empty_result_has_no_pages() {
        let pagination = Pagination::new(PageRequest::new(1, 20), 0);

        assert_eq!(pagination.total_pages, 0);
        assert!(!pagination.has_next_page);
        assert!(!pagination.has_prev_page);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(Pagination::new(PageRequest::new(2, 10), 35))
            .unwrap_or_default();

        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPages"], 4);
        assert_eq!(json["totalItems"], 35);
        assert_eq!(json["itemsPerPage"], 10);
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["hasPrevPage"], true);
    }
}
