//! API middleware
//!
//! Contains middleware for:
//! - Authentication (session token validation)
//! - Authorization (role checks for instructor and admin routes)
//! - Request statistics

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::UploadConfig;
use crate::db::repositories::{CourseRepository, EnrollmentRepository, UserRepository};
use crate::models::User;
use crate::services::{
    ContentError, ContentService, CourseService, CourseServiceError, EnrollmentError,
    EnrollmentService, PaymentError, PaymentService, QuizError, QuizService, ReviewError,
    ReviewService, SettingsError, SettingsService, UserService, UserServiceError,
};

// ============================================================================
// Request Statistics
// ============================================================================

/// Lightweight request statistics using atomic operations (no locks)
pub struct RequestStats {
    /// Total number of requests processed
    total_requests: AtomicU64,
    /// Total response time in microseconds (for calculating average)
    total_response_time_us: AtomicU64,
    /// Application start time
    start_time: Instant,
}

impl RequestStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a request with its response time
    pub fn record(&self, duration_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us
            .fetch_add(duration_us, Ordering::Relaxed);
    }

    /// Get total request count
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Get average response time in microseconds
    pub fn avg_response_time_us(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        let total_time = self.total_response_time_us.load(Ordering::Relaxed);
        total_time as f64 / total as f64
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub user_service: Arc<UserService>,
    pub course_service: Arc<CourseService>,
    pub enrollment_service: Arc<EnrollmentService>,
    pub payment_service: Arc<PaymentService>,
    pub quiz_service: Arc<QuizService>,
    pub review_service: Arc<ReviewService>,
    pub content_service: Arc<ContentService>,
    pub settings_service: Arc<SettingsService>,
    pub user_repo: Arc<dyn UserRepository>,
    pub course_repo: Arc<dyn CourseRepository>,
    pub enrollment_repo: Arc<dyn EnrollmentRepository>,
    pub upload_config: Arc<UploadConfig>,
    pub request_stats: Arc<RequestStats>,
}

/// Authenticated user extracted from request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Error envelope for API errors: `{ success: false, error, message }`
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: code.into(),
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::AuthenticationError(msg) => {
                if msg.contains("banned") {
                    ApiError::forbidden(msg)
                } else {
                    ApiError::unauthorized(msg)
                }
            }
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::UserExists(msg) => ApiError::conflict(msg),
            UserServiceError::UserNotFound => ApiError::not_found("User not found"),
            UserServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<CourseServiceError> for ApiError {
    fn from(e: CourseServiceError) -> Self {
        match e {
            CourseServiceError::NotFound(msg) => ApiError::not_found(msg),
            CourseServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CourseServiceError::DuplicateSlug(slug) => {
                ApiError::conflict(format!("Slug already exists: {}", slug))
            }
            CourseServiceError::Forbidden => {
                ApiError::forbidden("Not allowed to manage this course")
            }
            CourseServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<EnrollmentError> for ApiError {
    fn from(e: EnrollmentError) -> Self {
        match e {
            EnrollmentError::NotFound(msg) => ApiError::not_found(msg),
            EnrollmentError::NotPublished => {
                ApiError::validation_error("Course is not published")
            }
            EnrollmentError::AlreadyEnrolled => {
                ApiError::conflict("Already enrolled in this course")
            }
            EnrollmentError::NotEnrolled => ApiError::forbidden("No active enrollment"),
            EnrollmentError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(e: PaymentError) -> Self {
        match e {
            PaymentError::NotFound => ApiError::not_found("Payment not found"),
            PaymentError::AlreadyFinalized => {
                ApiError::conflict("Payment is already finalized")
            }
            PaymentError::ValidationError(msg) => ApiError::validation_error(msg),
            PaymentError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<QuizError> for ApiError {
    fn from(e: QuizError) -> Self {
        match e {
            QuizError::NotFound(msg) => ApiError::not_found(msg),
            QuizError::NotEnrolled => ApiError::forbidden("No active enrollment"),
            QuizError::ValidationError(msg) => ApiError::validation_error(msg),
            QuizError::Forbidden => ApiError::forbidden("Not allowed to manage this course"),
            QuizError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(e: ReviewError) -> Self {
        match e {
            ReviewError::NotFound(msg) => ApiError::not_found(msg),
            ReviewError::NotEnrolled => ApiError::forbidden("No active enrollment"),
            ReviewError::ValidationError(msg) => ApiError::validation_error(msg),
            ReviewError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        match e {
            ContentError::NotFound(key) => {
                ApiError::not_found(format!("Content block not found: {}", key))
            }
            ContentError::ValidationError(msg) => ApiError::validation_error(msg),
            ContentError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::ValidationError(msg) => ApiError::validation_error(msg),
            SettingsError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

/// Extract session token from request
fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await
        .map_err(|e| ApiError::internal_error(format!("Session validation failed: {}", e)))?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Admin authorization middleware
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_admin() {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

/// Instructor authorization middleware (admins pass as well)
pub async fn require_instructor(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_instructor() {
        return Err(ApiError::forbidden("Instructor privileges required"));
    }

    Ok(next.run(request).await)
}

/// Request statistics middleware
///
/// Records request count and response time for the admin stats endpoint.
pub async fn request_stats_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_us = start.elapsed().as_micros() as u64;
    state.request_stats.record(duration_us);

    response
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};

    fn create_request_with_auth(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn create_request_with_cookie(token: &str) -> Request<Body> {
        Request::builder()
            .uri("/test")
            .header(header::COOKIE, format!("session={}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_session_token_from_bearer() {
        let request = create_request_with_auth("test-token-123");
        assert_eq!(
            extract_session_token(&request),
            Some("test-token-123".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let request = create_request_with_cookie("test-token-456");
        assert_eq!(
            extract_session_token(&request),
            Some("test-token-456".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_bearer_priority() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer bearer-token")
            .header(header::COOKIE, "session=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_session_token(&request),
            Some("bearer-token".to_string())
        );
    }

    #[test]
    fn test_extract_session_token_none() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(extract_session_token(&request).is_none());
    }

    #[test]
    fn test_extract_session_token_invalid_bearer() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Basic invalid")
            .body(Body::empty())
            .unwrap();
        assert!(extract_session_token(&request).is_none());
    }

    #[test]
    fn test_api_error_unauthorized() {
        let error = ApiError::unauthorized("Test message");
        assert_eq!(error.error, "UNAUTHORIZED");
        assert!(!error.success);
    }

    #[test]
    fn test_api_error_from_enrollment_error() {
        let error: ApiError = EnrollmentError::AlreadyEnrolled.into();
        assert_eq!(error.error, "CONFLICT");

        let error: ApiError = EnrollmentError::NotEnrolled.into();
        assert_eq!(error.error, "FORBIDDEN");
    }

    #[test]
    fn test_api_error_from_payment_error() {
        let error: ApiError = PaymentError::AlreadyFinalized.into();
        assert_eq!(error.error, "CONFLICT");

        let error: ApiError = PaymentError::NotFound.into();
        assert_eq!(error.error, "NOT_FOUND");
    }
}

#[cfg(test)]
mod property_tests {
    use crate::models::{User, UserRole, UserStatus};
    use proptest::prelude::*;

    fn role_strategy() -> impl Strategy<Value = UserRole> {
        prop_oneof![
            Just(UserRole::Admin),
            Just(UserRole::Instructor),
            Just(UserRole::Student)
        ]
    }

    fn user_with_role(id: i64, role: UserRole) -> User {
        User {
            id,
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            role,
            status: UserStatus::Active,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Only the admin role passes the admin gate.
        #[test]
        fn only_admin_has_admin_access(role in role_strategy()) {
            let user = user_with_role(1, role);
            prop_assert_eq!(user.is_admin(), role == UserRole::Admin);
        }

        /// The instructor gate admits admins and instructors, never students.
        #[test]
        fn instructor_gate(role in role_strategy()) {
            let user = user_with_role(1, role);
            let expected = matches!(role, UserRole::Admin | UserRole::Instructor);
            prop_assert_eq!(user.is_instructor(), expected);
        }

        /// Instructors manage only their own courses.
        #[test]
        fn instructor_manages_own_courses(user_id in 1i64..100, owner_id in 1i64..100) {
            let user = user_with_role(user_id, UserRole::Instructor);
            prop_assert_eq!(user.can_manage_course(owner_id), user_id == owner_id);
        }

        /// Admins manage any course.
        #[test]
        fn admin_manages_any_course(user_id in 1i64..100, owner_id in 1i64..100) {
            let user = user_with_role(user_id, UserRole::Admin);
            prop_assert!(user.can_manage_course(owner_id));
        }

        /// Students never manage courses.
        #[test]
        fn student_manages_nothing(user_id in 1i64..100, owner_id in 1i64..100) {
            let user = user_with_role(user_id, UserRole::Student);
            prop_assert!(!user.can_manage_course(owner_id));
        }
    }
}
