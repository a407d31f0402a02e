//! Chapter model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chapter entity grouping lessons within a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    /// Unique identifier
    pub id: i64,
    /// Owning course ID
    pub course_id: i64,
    /// Chapter title
    pub title: String,
    /// Sort order within the course (lower = earlier)
    #[serde(default)]
    pub sort_order: i32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a chapter
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChapterInput {
    /// Chapter title
    pub title: String,
    /// Sort order (optional, appended at the end when omitted)
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Input for updating a chapter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateChapterInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New sort order (optional)
    pub sort_order: Option<i32>,
}

impl UpdateChapterInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some() || self.sort_order.is_some()
    }
}
