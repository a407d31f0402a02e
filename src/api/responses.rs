//! Shared API response types
//!
//! Success envelope `{ success: true, data, message? }` plus the response
//! shapes that differ from the stored models, mainly the public course
//! detail where lesson content is withheld unless the lesson is a free
//! preview.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::models::{Chapter, Course, CourseCategory, CourseFaq, Lesson};
use crate::services::ChapterOutline;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
            status: StatusCode::OK,
        }
    }

    /// 201 Created with data
    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(data)
        }
    }

    /// Attach a human-readable message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// Course Detail Response Types
// ============================================================================

/// Public course detail: the course plus its category, outline, and FAQs
#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    pub course: Course,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CourseCategory>,
    pub outline: Vec<ChapterView>,
    pub faqs: Vec<CourseFaq>,
}

/// A chapter with its lessons in the public outline
#[derive(Debug, Serialize)]
pub struct ChapterView {
    pub chapter: Chapter,
    pub lessons: Vec<LessonView>,
}

/// Public lesson view.
///
/// Content and video URL are only present for free-preview lessons; the
/// rest of the metadata is always visible so the outline can be rendered.
#[derive(Debug, Serialize)]
pub struct LessonView {
    pub id: i64,
    pub chapter_id: i64,
    pub title: String,
    pub duration_minutes: i32,
    pub is_free_preview: bool,
    pub sort_order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl From<Lesson> for LessonView {
    fn from(lesson: Lesson) -> Self {
        let (content, video_url) = if lesson.is_free_preview {
            (Some(lesson.content), Some(lesson.video_url))
        } else {
            (None, None)
        };
        Self {
            id: lesson.id,
            chapter_id: lesson.chapter_id,
            title: lesson.title,
            duration_minutes: lesson.duration_minutes,
            is_free_preview: lesson.is_free_preview,
            sort_order: lesson.sort_order,
            content,
            video_url,
        }
    }
}

impl From<ChapterOutline> for ChapterView {
    fn from(outline: ChapterOutline) -> Self {
        Self {
            chapter: outline.chapter,
            lessons: outline.lessons.into_iter().map(LessonView::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lesson(is_free_preview: bool) -> Lesson {
        Lesson {
            id: 1,
            chapter_id: 2,
            course_id: 3,
            title: "Intro".to_string(),
            content: "Secret body".to_string(),
            video_url: "https://cdn.example.com/v.mp4".to_string(),
            duration_minutes: 12,
            is_free_preview,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_locked_lesson_withholds_content() {
        let view = LessonView::from(lesson(false));
        assert!(view.content.is_none());
        assert!(view.video_url.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("content").is_none());
        assert!(json.get("video_url").is_none());
        assert_eq!(json["title"], "Intro");
    }

    #[test]
    fn test_free_preview_lesson_exposes_content() {
        let view = LessonView::from(lesson(true));
        assert_eq!(view.content.as_deref(), Some("Secret body"));
        assert_eq!(view.video_url.as_deref(), Some("https://cdn.example.com/v.mp4"));
    }

    #[test]
    fn test_success_envelope_shape() {
        let response = ApiResponse::ok(serde_json::json!({"id": 1})).with_message("done");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["id"], 1);
        assert_eq!(json["message"], "done");
    }
}
