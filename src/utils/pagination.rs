use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 50;

#[derive(Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PaginationParams {
    /// Normalized `(page, limit)` pair, 1-based page, limit clamped to
    /// `1..=MAX_LIMIT`.
    pub fn normalize(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        (page, limit)
    }
}

#[derive(Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            // ceil(total / limit)
            pages: (total + limit - 1) / limit,
        }
    }
}

pub fn offset(page: i64, limit: i64) -> i64 {
    (page - 1) * limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_is_ceiling_of_total_over_limit() {
        assert_eq!(Pagination::new(1, 10, 0).pages, 0);
        assert_eq!(Pagination::new(1, 10, 1).pages, 1);
        assert_eq!(Pagination::new(1, 10, 10).pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).pages, 2);
        assert_eq!(Pagination::new(1, 3, 7).pages, 3);
    }

    #[test]
    fn offset_skips_previous_pages() {
        assert_eq!(offset(1, 10), 0);
        assert_eq!(offset(2, 10), 10);
        assert_eq!(offset(5, 3), 12);
    }

    #[test]
    fn normalize_defaults_and_clamps() {
        let params = PaginationParams {
            page: None,
            limit: None,
        };
        assert_eq!(params.normalize(), (1, DEFAULT_LIMIT));

        let params = PaginationParams {
            page: Some(0),
            limit: Some(500),
        };
        assert_eq!(params.normalize(), (1, MAX_LIMIT));

        let params = PaginationParams {
            page: Some(3),
            limit: Some(-2),
        };
        assert_eq!(params.normalize(), (3, 1));
    }
}
