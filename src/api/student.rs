//! Student API endpoints (authenticated)
//!
//! - POST /api/v1/student/enrollments - enroll in a published course
//! - GET  /api/v1/student/enrollments - my courses with progress
//! - POST /api/v1/student/lessons/{id}/complete - mark lesson complete
//! - GET  /api/v1/student/lessons/{id}/quiz - questions without answers
//! - POST /api/v1/student/lessons/{id}/quiz - submit answers for grading
//! - GET  /api/v1/student/lessons/{id}/quiz/result - latest stored result
//! - GET/POST/DELETE /api/v1/student/courses/{id}/review - own review

use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::ApiResponse;
use crate::models::{CourseReview, QuizAttempt, QuizSubmission, ReviewInput};
use crate::services::{
    EnrollmentOutcome, EnrollmentProgress, QuizResult, StudentQuestion,
};

/// Request body for enrolling in a course
#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub course_id: i64,
}

/// Build the student router (mounted behind the auth middleware)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/enrollments", post(enroll))
        .route("/enrollments", get(list_enrollments))
        .route("/lessons/{id}/complete", post(complete_lesson))
        .route("/lessons/{id}/quiz", get(get_quiz))
        .route("/lessons/{id}/quiz", post(submit_quiz))
        .route("/lessons/{id}/quiz/result", get(quiz_result))
        .route("/courses/{id}/review", get(get_own_review))
        .route("/courses/{id}/review", post(upsert_review))
        .route("/courses/{id}/review", delete(delete_review))
}

/// POST /api/v1/student/enrollments
///
/// Free courses activate immediately; paid courses return checkout info
/// for the gateway redirect.
async fn enroll(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<EnrollRequest>,
) -> Result<ApiResponse<EnrollmentOutcome>, ApiError> {
    let outcome = state
        .enrollment_service
        .enroll(&user.0, body.course_id)
        .await?;
    Ok(ApiResponse::created(outcome))
}

/// GET /api/v1/student/enrollments - enrolled courses with progress
async fn list_enrollments(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<ApiResponse<Vec<EnrollmentProgress>>, ApiError> {
    Ok(ApiResponse::ok(
        state.enrollment_service.list_with_progress(&user.0).await?,
    ))
}

/// POST /api/v1/student/lessons/{id}/complete - idempotent
async fn complete_lesson(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(lesson_id): Path<i64>,
) -> Result<ApiResponse<EnrollmentProgress>, ApiError> {
    Ok(ApiResponse::ok(
        state
            .enrollment_service
            .complete_lesson(&user.0, lesson_id)
            .await?,
    ))
}

/// GET /api/v1/student/lessons/{id}/quiz - questions with answers withheld
async fn get_quiz(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(lesson_id): Path<i64>,
) -> Result<ApiResponse<Vec<StudentQuestion>>, ApiError> {
    Ok(ApiResponse::ok(
        state
            .quiz_service
            .questions_for_student(&user.0, lesson_id)
            .await?,
    ))
}

/// POST /api/v1/student/lessons/{id}/quiz - grade and store the submission
async fn submit_quiz(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(lesson_id): Path<i64>,
    Json(submission): Json<QuizSubmission>,
) -> Result<ApiResponse<QuizResult>, ApiError> {
    Ok(ApiResponse::ok(
        state
            .quiz_service
            .submit(&user.0, lesson_id, submission)
            .await?,
    ))
}

/// GET /api/v1/student/lessons/{id}/quiz/result - latest attempt, if any
async fn quiz_result(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(lesson_id): Path<i64>,
) -> Result<ApiResponse<Option<QuizAttempt>>, ApiError> {
    Ok(ApiResponse::ok(
        state.quiz_service.result(&user.0, lesson_id).await?,
    ))
}

/// GET /api/v1/student/courses/{id}/review - own review of a course
async fn get_own_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(course_id): Path<i64>,
) -> Result<ApiResponse<CourseReview>, ApiError> {
    state
        .review_service
        .get_own(&user.0, course_id)
        .await?
        .map(ApiResponse::ok)
        .ok_or_else(|| ApiError::not_found("Review not found"))
}

/// POST /api/v1/student/courses/{id}/review - create or replace own review
async fn upsert_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(course_id): Path<i64>,
    Json(input): Json<ReviewInput>,
) -> Result<ApiResponse<CourseReview>, ApiError> {
    Ok(ApiResponse::ok(
        state.review_service.upsert(&user.0, course_id, input).await?,
    ))
}

/// DELETE /api/v1/student/courses/{id}/review
async fn delete_review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(course_id): Path<i64>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state.review_service.delete_own(&user.0, course_id).await?;
    Ok(ApiResponse::ok(serde_json::json!({})).with_message("Review deleted"))
}
