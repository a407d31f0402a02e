//! Course FAQ model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Frequently asked question attached to a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseFaq {
    /// Unique identifier
    pub id: i64,
    /// Owning course ID
    pub course_id: i64,
    /// Question text
    pub question: String,
    /// Answer text
    pub answer: String,
    /// Sort order (lower = earlier)
    #[serde(default)]
    pub sort_order: i32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a FAQ entry
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFaqInput {
    /// Question text
    pub question: String,
    /// Answer text
    pub answer: String,
    /// Sort order (optional)
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Input for updating a FAQ entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFaqInput {
    /// New question (optional)
    pub question: Option<String>,
    /// New answer (optional)
    pub answer: Option<String>,
    /// New sort order (optional)
    pub sort_order: Option<i32>,
}

impl UpdateFaqInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.question.is_some() || self.answer.is_some() || self.sort_order.is_some()
    }
}
