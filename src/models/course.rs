//! Course model
//!
//! This module provides:
//! - `Course` entity representing a course in the catalog
//! - `CourseStatus` enum for publication states
//! - Input types for creating and updating courses
//! - Pagination types shared by all list queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Course title
    pub title: String,
    /// Short summary shown in the catalog
    #[serde(default)]
    pub summary: String,
    /// Full description
    #[serde(default)]
    pub description: String,
    /// Thumbnail image URL
    #[serde(default)]
    pub thumbnail: String,
    /// Price in minor currency units (0 = free)
    #[serde(default)]
    pub price: i64,
    /// ISO currency code
    pub currency: String,
    /// Instructor user ID
    pub instructor_id: i64,
    /// Category ID
    pub category_id: Option<i64>,
    /// Publication status
    pub status: CourseStatus,
    /// Number of active enrollments
    #[serde(default)]
    pub enrolled_count: i64,
    /// Sum of all review ratings
    #[serde(default)]
    pub rating_sum: i64,
    /// Number of reviews
    #[serde(default)]
    pub rating_count: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Check if the course is free
    pub fn is_free(&self) -> bool {
        self.price == 0
    }

    /// Average rating, rounded to one decimal place. None when unrated.
    pub fn average_rating(&self) -> Option<f64> {
        if self.rating_count == 0 {
            None
        } else {
            Some((self.rating_sum as f64 / self.rating_count as f64 * 10.0).round() / 10.0)
        }
    }
}

/// Course publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    /// Draft - not visible to public
    Draft,
    /// Published - visible in the catalog and open for enrollment
    Published,
    /// Archived - hidden from the catalog, existing enrollments keep access
    Archived,
}

impl Default for CourseStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl CourseStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Draft => "draft",
            CourseStatus::Published => "published",
            CourseStatus::Archived => "archived",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(CourseStatus::Draft),
            "published" => Some(CourseStatus::Published),
            "archived" => Some(CourseStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a new course
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseInput {
    /// URL-friendly slug
    pub slug: String,
    /// Course title
    pub title: String,
    /// Short summary (optional)
    #[serde(default)]
    pub summary: Option<String>,
    /// Full description (optional)
    #[serde(default)]
    pub description: Option<String>,
    /// Thumbnail URL (optional)
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Price in minor units (optional, defaults to 0 = free)
    #[serde(default)]
    pub price: Option<i64>,
    /// Currency code (optional, defaults to the configured currency)
    #[serde(default)]
    pub currency: Option<String>,
    /// Category ID (optional)
    #[serde(default)]
    pub category_id: Option<i64>,
}

/// Input for updating an existing course
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseInput {
    /// New slug (optional)
    pub slug: Option<String>,
    /// New title (optional)
    pub title: Option<String>,
    /// New summary (optional)
    pub summary: Option<String>,
    /// New description (optional)
    pub description: Option<String>,
    /// New thumbnail URL (optional)
    pub thumbnail: Option<String>,
    /// New price (optional)
    pub price: Option<i64>,
    /// New currency (optional)
    pub currency: Option<String>,
    /// New category ID (optional)
    pub category_id: Option<i64>,
    /// New status (optional)
    pub status: Option<CourseStatus>,
}

impl UpdateCourseInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.slug.is_some()
            || self.title.is_some()
            || self.summary.is_some()
            || self.description.is_some()
            || self.thumbnail.is_some()
            || self.price.is_some()
            || self.currency.is_some()
            || self.category_id.is_some()
            || self.status.is_some()
    }
}

/// Catalog filters for public course listings
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    /// Restrict to a category
    pub category_id: Option<i64>,
    /// Case-insensitive substring match on title and summary
    pub search: Option<String>,
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl ListParams {
    /// Create new pagination parameters
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    /// Calculate the offset for database queries
    pub fn offset(&self) -> i64 {
        ((self.page.saturating_sub(1)) * self.per_page) as i64
    }

    /// Get the limit for database queries
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Paginated result container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResult<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> PagedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            page: params.page,
            per_page: params.per_page,
        }
    }

    /// Calculate the total number of pages
    pub fn total_pages(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        ((self.total as u32) + self.per_page - 1) / self.per_page
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            per_page: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_status_roundtrip() {
        for status in [CourseStatus::Draft, CourseStatus::Published, CourseStatus::Archived] {
            assert_eq!(CourseStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(CourseStatus::from_str("bogus"), None);
    }

    #[test]
    fn test_average_rating() {
        let mut course = sample_course();
        assert_eq!(course.average_rating(), None);

        course.rating_sum = 9;
        course.rating_count = 2;
        assert_eq!(course.average_rating(), Some(4.5));

        course.rating_sum = 10;
        course.rating_count = 3;
        assert_eq!(course.average_rating(), Some(3.3));
    }

    #[test]
    fn test_list_params_clamping() {
        let params = ListParams::new(0, 500);
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 100);
        assert_eq!(params.offset(), 0);

        let params = ListParams::new(3, 20);
        assert_eq!(params.offset(), 40);
        assert_eq!(params.limit(), 20);
    }

    #[test]
    fn test_paged_result_total_pages() {
        let params = ListParams::new(1, 10);
        let result: PagedResult<i32> = PagedResult::new(vec![], 25, &params);
        assert_eq!(result.total_pages(), 3);
        assert!(result.has_next());
        assert!(!result.has_prev());
    }

    fn sample_course() -> Course {
        let now = chrono::Utc::now();
        Course {
            id: 1,
            slug: "rust-basics".to_string(),
            title: "Rust Basics".to_string(),
            summary: String::new(),
            description: String::new(),
            thumbnail: String::new(),
            price: 0,
            currency: "USD".to_string(),
            instructor_id: 1,
            category_id: None,
            status: CourseStatus::Published,
            enrolled_count: 0,
            rating_sum: 0,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
