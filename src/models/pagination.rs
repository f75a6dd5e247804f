//! 分页相关的数据结构

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Postgres OFFSET 是 bigint
const MAX_OFFSET: u64 = i64::MAX as u64;

/// Lists return everything unless `limit` (or `page`) is supplied.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PaginationParams {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self { page, limit }
    }

    pub fn get_page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// 没有显式 limit 时使用 `default_limit`，两者都没有则不分页
    pub fn effective_limit(&self, default_limit: Option<u64>) -> Option<u64> {
        match (self.limit.or(default_limit), self.page) {
            (Some(limit), _) => Some(limit.clamp(1, 100)),
            (None, Some(_)) => Some(20),
            (None, None) => None,
        }
    }

    /// 超大页码得到空页而不是溢出
    pub fn get_offset(&self, limit: u64) -> u64 {
        (self.get_page() - 1).saturating_mul(limit).min(MAX_OFFSET)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total: u64) -> Self {
        let total_pages = if total == 0 {
            1
        } else {
            total.div_ceil(page_size.max(1))
        };
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    pub fn unpaged(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            total,
            page: 1,
            page_size: total,
            total_pages: 1,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaged_by_default() {
        let params = PaginationParams::default();
        assert_eq!(params.effective_limit(None), None);
        assert_eq!(params.get_page(), 1);
    }

    #[test]
    fn test_default_limit_applies() {
        let params = PaginationParams::new(Some(3), None);
        assert_eq!(params.effective_limit(Some(10)), Some(10));
        assert_eq!(params.get_offset(10), 20);
    }

    #[test]
    fn test_limit_is_clamped() {
        let params = PaginationParams::new(None, Some(1000));
        assert_eq!(params.effective_limit(None), Some(100));
        let params = PaginationParams::new(Some(0), Some(0));
        assert_eq!(params.effective_limit(None), Some(1));
        assert_eq!(params.get_page(), 1);
    }

    #[test]
    fn test_huge_page_offset_saturates() {
        let params = PaginationParams::new(Some(u64::MAX), Some(100));
        assert_eq!(params.get_offset(100), i64::MAX as u64);
        let params = PaginationParams::new(Some(u64::MAX / 50), Some(100));
        assert_eq!(params.get_offset(100), i64::MAX as u64);
    }

    #[test]
    fn test_total_pages() {
        let resp = PaginatedResponse::new(vec![1, 2], 2, 10, 25);
        assert_eq!(resp.total_pages, 3);
        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], 1, 10, 0);
        assert_eq!(empty.total_pages, 1);
        let all = PaginatedResponse::unpaged(vec!["a", "b", "c"]);
        assert_eq!(all.total, 3);
        assert_eq!(all.total_pages, 1);
    }
}
