//! Course review model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course review entity.
///
/// One review per student per course; resubmitting replaces the existing
/// review. Rating aggregates are mirrored on the course row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseReview {
    /// Unique identifier
    pub id: i64,
    /// Reviewing student user ID
    pub student_id: i64,
    /// Course ID
    pub course_id: i64,
    /// Rating, 1 to 5
    pub rating: i32,
    /// Review text
    #[serde(default)]
    pub comment: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a review
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    /// Rating, 1 to 5
    pub rating: i32,
    /// Review text (optional)
    #[serde(default)]
    pub comment: Option<String>,
}

impl ReviewInput {
    /// Check if the rating is within the allowed range
    pub fn is_rating_valid(&self) -> bool {
        (1..=5).contains(&self.rating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_range() {
        for rating in 1..=5 {
            assert!(ReviewInput { rating, comment: None }.is_rating_valid());
        }
        assert!(!ReviewInput { rating: 0, comment: None }.is_rating_valid());
        assert!(!ReviewInput { rating: 6, comment: None }.is_rating_valid());
        assert!(!ReviewInput { rating: -1, comment: None }.is_rating_valid());
    }
}
