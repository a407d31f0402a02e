//! Instructor API endpoints
//!
//! Course management for instructors, scoped to courses they own; admins
//! pass the same checks for any course. Mounted behind the auth and
//! instructor middlewares.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::ApiResponse;
use crate::models::{
    Chapter, Course, CourseFaq, CourseStatus, CreateChapterInput, CreateCourseInput,
    CreateFaqInput, CreateLessonInput, CreateQuestionInput, Lesson, PagedResult, QuizQuestion,
    UpdateChapterInput, UpdateCourseInput, UpdateFaqInput, UpdateLessonInput, UpdateQuestionInput,
};

/// Request body for changing a course's publication status
#[derive(Debug, Deserialize)]
pub struct SetCourseStatusRequest {
    pub status: CourseStatus,
}

/// Build the instructor router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_own_courses))
        .route("/courses", post(create_course))
        .route("/courses/{id}", put(update_course))
        .route("/courses/{id}", delete(delete_course))
        .route("/courses/{id}/status", put(set_course_status))
        .route("/courses/{id}/chapters", post(create_chapter))
        .route("/chapters/{id}", put(update_chapter))
        .route("/chapters/{id}", delete(delete_chapter))
        .route("/chapters/{id}/lessons", post(create_lesson))
        .route("/lessons/{id}", put(update_lesson))
        .route("/lessons/{id}", delete(delete_lesson))
        .route("/courses/{id}/faqs", post(create_faq))
        .route("/faqs/{id}", put(update_faq))
        .route("/faqs/{id}", delete(delete_faq))
        .route("/lessons/{id}/questions", get(list_questions))
        .route("/lessons/{id}/questions", post(create_question))
        .route("/questions/{id}", put(update_question))
        .route("/questions/{id}", delete(delete_question))
}

// ---- Courses ----

/// GET /api/v1/instructor/courses - own courses including drafts
async fn list_own_courses(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<PaginationQuery>,
) -> Result<ApiResponse<PagedResult<Course>>, ApiError> {
    Ok(ApiResponse::ok(
        state
            .course_service
            .list_by_instructor(user.0.id, &query.params())
            .await?,
    ))
}

/// POST /api/v1/instructor/courses - new courses start as drafts
async fn create_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<CreateCourseInput>,
) -> Result<ApiResponse<Course>, ApiError> {
    Ok(ApiResponse::created(
        state.course_service.create_course(&user.0, input).await?,
    ))
}

/// PUT /api/v1/instructor/courses/{id}
async fn update_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateCourseInput>,
) -> Result<ApiResponse<Course>, ApiError> {
    Ok(ApiResponse::ok(
        state.course_service.update_course(&user.0, id, input).await?,
    ))
}

/// DELETE /api/v1/instructor/courses/{id}
async fn delete_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state.course_service.delete_course(&user.0, id).await?;
    Ok(ApiResponse::ok(serde_json::json!({})).with_message("Course deleted"))
}

/// PUT /api/v1/instructor/courses/{id}/status - publish or archive
async fn set_course_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<SetCourseStatusRequest>,
) -> Result<ApiResponse<Course>, ApiError> {
    Ok(ApiResponse::ok(
        state
            .course_service
            .set_status(&user.0, id, body.status)
            .await?,
    ))
}

// ---- Chapters ----

/// POST /api/v1/instructor/courses/{id}/chapters
async fn create_chapter(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(course_id): Path<i64>,
    Json(input): Json<CreateChapterInput>,
) -> Result<ApiResponse<Chapter>, ApiError> {
    Ok(ApiResponse::created(
        state
            .course_service
            .create_chapter(&user.0, course_id, input)
            .await?,
    ))
}

/// PUT /api/v1/instructor/chapters/{id}
async fn update_chapter(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateChapterInput>,
) -> Result<ApiResponse<Chapter>, ApiError> {
    Ok(ApiResponse::ok(
        state.course_service.update_chapter(&user.0, id, input).await?,
    ))
}

/// DELETE /api/v1/instructor/chapters/{id}
async fn delete_chapter(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state.course_service.delete_chapter(&user.0, id).await?;
    Ok(ApiResponse::ok(serde_json::json!({})).with_message("Chapter deleted"))
}

// ---- Lessons ----

/// POST /api/v1/instructor/chapters/{id}/lessons
async fn create_lesson(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(chapter_id): Path<i64>,
    Json(input): Json<CreateLessonInput>,
) -> Result<ApiResponse<Lesson>, ApiError> {
    Ok(ApiResponse::created(
        state
            .course_service
            .create_lesson(&user.0, chapter_id, input)
            .await?,
    ))
}

/// PUT /api/v1/instructor/lessons/{id}
async fn update_lesson(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateLessonInput>,
) -> Result<ApiResponse<Lesson>, ApiError> {
    Ok(ApiResponse::ok(
        state.course_service.update_lesson(&user.0, id, input).await?,
    ))
}

/// DELETE /api/v1/instructor/lessons/{id}
async fn delete_lesson(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state.course_service.delete_lesson(&user.0, id).await?;
    Ok(ApiResponse::ok(serde_json::json!({})).with_message("Lesson deleted"))
}

// ---- FAQs ----

/// POST /api/v1/instructor/courses/{id}/faqs
async fn create_faq(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(course_id): Path<i64>,
    Json(input): Json<CreateFaqInput>,
) -> Result<ApiResponse<CourseFaq>, ApiError> {
    Ok(ApiResponse::created(
        state
            .course_service
            .create_faq(&user.0, course_id, input)
            .await?,
    ))
}

/// PUT /api/v1/instructor/faqs/{id}
async fn update_faq(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateFaqInput>,
) -> Result<ApiResponse<CourseFaq>, ApiError> {
    Ok(ApiResponse::ok(
        state.course_service.update_faq(&user.0, id, input).await?,
    ))
}

/// DELETE /api/v1/instructor/faqs/{id}
async fn delete_faq(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state.course_service.delete_faq(&user.0, id).await?;
    Ok(ApiResponse::ok(serde_json::json!({})).with_message("FAQ deleted"))
}

// ---- Quiz questions ----

/// GET /api/v1/instructor/lessons/{id}/questions - with correct answers
async fn list_questions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(lesson_id): Path<i64>,
) -> Result<ApiResponse<Vec<QuizQuestion>>, ApiError> {
    Ok(ApiResponse::ok(
        state.quiz_service.list_questions(&user.0, lesson_id).await?,
    ))
}

/// POST /api/v1/instructor/lessons/{id}/questions
async fn create_question(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(lesson_id): Path<i64>,
    Json(input): Json<CreateQuestionInput>,
) -> Result<ApiResponse<QuizQuestion>, ApiError> {
    Ok(ApiResponse::created(
        state
            .quiz_service
            .create_question(&user.0, lesson_id, input)
            .await?,
    ))
}

/// PUT /api/v1/instructor/questions/{id}
async fn update_question(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateQuestionInput>,
) -> Result<ApiResponse<QuizQuestion>, ApiError> {
    Ok(ApiResponse::ok(
        state
            .quiz_service
            .update_question(&user.0, id, input)
            .await?,
    ))
}

/// DELETE /api/v1/instructor/questions/{id}
async fn delete_question(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state.quiz_service.delete_question(&user.0, id).await?;
    Ok(ApiResponse::ok(serde_json::json!({})).with_message("Question deleted"))
}
