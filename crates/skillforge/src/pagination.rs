// Pagination helpers shared by the list endpoints.

use serde::{Deserialize, Serialize};

use skillforge_core::options::PaginationOptions;

/// Raw page/limit parameters as they arrive from the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PageWindow {
    /// Normalize client parameters against the configured defaults:
    /// page is at least 1, limit is clamped to [1, max_limit].
    pub fn resolve(params: &PageParams, options: &PaginationOptions) -> Self {
        let page = params.page.unwrap_or(1).max(1);
        let limit = params
            .limit
            .unwrap_or(options.default_limit)
            .clamp(1, options.max_limit);
        Self {
            page,
            limit,
            offset: (page - 1) * limit,
        }
    }
}

/// Reference to a neighboring page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageRef {
    pub page: i64,
    pub limit: i64,
}

/// Next/previous descriptors included in paginated responses.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl Pagination {
    /// Build next/prev descriptors from the window and the total match count.
    pub fn build(window: PageWindow, total: i64) -> Self {
        let mut pagination = Pagination::default();
        if window.offset + window.limit < total {
            pagination.next = Some(PageRef {
                page: window.page + 1,
                limit: window.limit,
            });
        }
        if window.offset > 0 {
            pagination.prev = Some(PageRef {
                page: window.page - 1,
                limit: window.limit,
            });
        }
        pagination
    }
}
