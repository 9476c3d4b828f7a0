//! Page/limit pagination shared by list endpoints

use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Normalized page request: `page` is 1-based, `limit` clamped to 1..=MAX_LIMIT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    /// Rows to skip, saturating on huge page numbers
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata returned alongside a page of rows
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            (total + request.limit - 1) / request.limit
        };
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages,
        }
    }
}

/// A page of rows with its pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            pagination: Pagination::new(request, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_page_of_ten_starts_at_eleventh_row() {
        let request = PageRequest::new(Some(2), Some(10));
        assert_eq!(request.offset(), 10);

        let pagination = Pagination::new(request, 25);
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(Pagination::new(request, 20).total_pages, 2);
        assert_eq!(Pagination::new(request, 0).total_pages, 0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let request = PageRequest::new(Some(0), Some(1000));
        assert_eq!(request.page, 1);
        assert_eq!(request.limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(None, Some(-5)).limit, 1);
        assert_eq!(PageRequest::default().limit, DEFAULT_LIMIT);
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let request = PageRequest::new(Some(i64::MAX), Some(10));
        assert_eq!(request.page, i64::MAX);
        assert_eq!(request.offset(), i64::MAX);
        assert_eq!(PageRequest::new(Some(i64::MAX), Some(1)).offset(), i64::MAX - 1);
    }

    #[test]
    fn metadata_serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(PageRequest::default(), 11)).unwrap();
        assert_eq!(json["totalPages"], 2);
    }
}
