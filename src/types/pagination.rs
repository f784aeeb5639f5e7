//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_NUMBER, MAX_PAGE_SIZE};

/// `?page=&per_page=` query parameters
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    /// Page number clamped to `1..=MAX_PAGE_NUMBER`
    pub fn page_number(&self) -> u64 {
        self.page.clamp(1, MAX_PAGE_NUMBER)
    }

    /// Zero-based page index, as the paginator expects it
    pub fn page_index(&self) -> u64 {
        self.page_number() - 1
    }

    /// Rows to skip for the requested page
    pub fn offset(&self) -> u64 {
        self.page_index().saturating_mul(self.limit())
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`
    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// List response with paging metadata
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let page = params.page_number();
        let per_page = params.limit();
        let total_pages = total.div_ceil(per_page);

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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        let params = PaginationParams { page: 1, per_page: 0 };
        assert_eq!(params.limit(), 1);

        let params = PaginationParams { page: 1, per_page: 10_000 };
        assert_eq!(params.limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_and_meta() {
        let params = PaginationParams { page: 3, per_page: 10 };
        assert_eq!(params.offset(), 20);

        let page = Paginated::new(vec![1, 2, 3], &params, 23);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.page, 3);
    }

    #[test]
    fn test_huge_page_is_clamped() {
        let params = PaginationParams {
            page: u64::MAX,
            per_page: MAX_PAGE_SIZE,
        };
        assert_eq!(params.page_number(), MAX_PAGE_NUMBER);
        assert_eq!(params.offset(), (MAX_PAGE_NUMBER - 1) * MAX_PAGE_SIZE);

        let first = PaginationParams { page: 0, per_page: 10 };
        assert_eq!(first.page_index(), 0);
        assert_eq!(first.offset(), 0);
    }
}
