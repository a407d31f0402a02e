//! Lesson model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lesson entity
///
/// Lessons belong to a chapter and carry a denormalized `course_id` so
/// enrollment checks do not need to walk the chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    /// Unique identifier
    pub id: i64,
    /// Owning chapter ID
    pub chapter_id: i64,
    /// Owning course ID
    pub course_id: i64,
    /// Lesson title
    pub title: String,
    /// Lesson body content
    #[serde(default)]
    pub content: String,
    /// Video URL
    #[serde(default)]
    pub video_url: String,
    /// Duration in minutes
    #[serde(default)]
    pub duration_minutes: i32,
    /// Whether the lesson is viewable without enrollment
    #[serde(default)]
    pub is_free_preview: bool,
    /// Sort order within the chapter (lower = earlier)
    #[serde(default)]
    pub sort_order: i32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a lesson
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLessonInput {
    /// Lesson title
    pub title: String,
    /// Lesson body content (optional)
    #[serde(default)]
    pub content: Option<String>,
    /// Video URL (optional)
    #[serde(default)]
    pub video_url: Option<String>,
    /// Duration in minutes (optional)
    #[serde(default)]
    pub duration_minutes: Option<i32>,
    /// Free preview flag (optional, defaults to false)
    #[serde(default)]
    pub is_free_preview: Option<bool>,
    /// Sort order (optional, appended at the end when omitted)
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Input for updating a lesson
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLessonInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New content (optional)
    pub content: Option<String>,
    /// New video URL (optional)
    pub video_url: Option<String>,
    /// New duration (optional)
    pub duration_minutes: Option<i32>,
    /// New free preview flag (optional)
    pub is_free_preview: Option<bool>,
    /// New sort order (optional)
    pub sort_order: Option<i32>,
}

impl UpdateLessonInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.video_url.is_some()
            || self.duration_minutes.is_some()
            || self.is_free_preview.is_some()
            || self.sort_order.is_some()
    }
}
