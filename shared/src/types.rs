//! Common types used across the platform

use serde::{Deserialize, Serialize};
use validator::Validate;

/// GPS coordinates of a field
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Validate)]
pub struct GpsCoordinates {
    #[validate(range(min = -90.0, max = 90.0, message = "Invalid latitude"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Invalid longitude"))]
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Largest page size a caller may request
    pub const MAX_LIMIT: u32 = 100;

    /// Build pagination from optional query values, clamping to sane bounds
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(10).clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Number of rows to skip for this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Build the response metadata for a result page
    pub fn meta(&self, returned: usize, total: u64) -> PaginationMeta {
        let pages = total.div_ceil(u64::from(self.limit)) as u32;
        PaginationMeta {
            current: self.page,
            pages,
            total,
            has_next: self.offset() + (returned as u64) < total,
            has_prev: self.page > 1,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current: u32,
    pub pages: u32,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let p = Pagination::from_query(None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 10);

        let p = Pagination::from_query(Some(0), Some(1000));
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, Pagination::MAX_LIMIT);
    }

    #[test]
    fn test_pagination_meta() {
        let p = Pagination::from_query(Some(2), Some(10));
        assert_eq!(p.offset(), 10);

        let meta = p.meta(10, 25);
        assert_eq!(meta.pages, 3);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let last = Pagination::from_query(Some(3), Some(10)).meta(5, 25);
        assert!(!last.has_next);
    }

    #[test]
    fn test_pagination_meta_empty() {
        let meta = Pagination::default().meta(0, 0);
        assert_eq!(meta.pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }
}
