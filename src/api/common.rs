//! Common API utilities and shared query types

use serde::Deserialize;

use crate::models::{CourseFilter, ListParams};

/// Default page number (1-indexed)
pub fn default_page() -> u32 {
    1
}

/// Default page size
pub fn default_per_page() -> u32 {
    10
}

/// Basic pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl PaginationQuery {
    /// Convert to clamped list parameters
    pub fn params(&self) -> ListParams {
        ListParams::new(self.page, self.per_page)
    }
}

/// Catalog query parameters: pagination plus category/search filters
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub category: Option<i64>,
    pub search: Option<String>,
}

impl CatalogQuery {
    /// Split into list parameters and a course filter
    pub fn into_parts(self) -> (ListParams, CourseFilter) {
        (
            ListParams::new(self.page, self.per_page),
            CourseFilter {
                category_id: self.category,
                search: self.search.filter(|s| !s.trim().is_empty()),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_query_clamps() {
        let query = PaginationQuery { page: 0, per_page: 500 };
        let params = query.params();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
    }

    #[test]
    fn test_catalog_query_blank_search_dropped() {
        let query = CatalogQuery {
            page: 1,
            per_page: 10,
            category: Some(3),
            search: Some("   ".to_string()),
        };
        let (_, filter) = query.into_parts();
        assert_eq!(filter.category_id, Some(3));
        assert!(filter.search.is_none());
    }
}
