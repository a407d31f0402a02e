//! Admin API endpoints
//!
//! Mounted behind the auth and admin middlewares:
//! - User management (list, role change, ban/unban)
//! - Category CRUD
//! - Course overview across all instructors
//! - Payment list and manual status updates
//! - Site settings and CMS content blocks
//! - Platform statistics

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::PaginationQuery;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::ApiResponse;
use crate::models::{
    ContentBlock, Course, CourseCategory, CreateCategoryInput, PagedResult, Payment,
    PaymentStatus, Setting, UpdateCategoryInput, User, UserRole, UserStatus,
};
use crate::services::SiteSettings;

/// Request body for changing a user's role
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

/// Request body for banning or unbanning a user
#[derive(Debug, Deserialize)]
pub struct SetUserStatusRequest {
    pub status: UserStatus,
}

/// Request body for a manual payment status update
#[derive(Debug, Deserialize)]
pub struct SetPaymentStatusRequest {
    pub status: PaymentStatus,
    pub reason: Option<String>,
}

/// Platform statistics
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub users: i64,
    pub courses: i64,
    pub enrollments: i64,
    /// Sum of completed payment amounts, in minor currency units
    pub revenue_total: i64,
    pub total_requests: u64,
    pub avg_response_time_us: f64,
    pub uptime_seconds: u64,
}

/// Build the admin router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}/role", put(set_user_role))
        .route("/users/{id}/status", put(set_user_status))
        .route("/courses", get(list_all_courses))
        .route("/categories", axum::routing::post(create_category))
        .route("/categories/{id}", put(update_category))
        .route("/categories/{id}", delete(delete_category))
        .route("/payments", get(list_payments))
        .route("/payments/{id}/status", put(set_payment_status))
        .route("/settings", get(get_settings))
        .route("/settings", put(update_settings))
        .route("/settings/raw", get(list_raw_settings))
        .route("/content", get(list_content))
        .route("/content/{key}", put(upsert_content))
        .route("/content/{key}", delete(delete_content))
        .route("/stats", get(stats))
}

// ---- Users ----

/// GET /api/v1/admin/users
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<ApiResponse<PagedResult<User>>, ApiError> {
    Ok(ApiResponse::ok(
        state.user_service.list(&query.params()).await?,
    ))
}

/// PUT /api/v1/admin/users/{id}/role
async fn set_user_role(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SetRoleRequest>,
) -> Result<ApiResponse<User>, ApiError> {
    Ok(ApiResponse::ok(
        state.user_service.set_role(id, body.role).await?,
    ))
}

/// PUT /api/v1/admin/users/{id}/status - banning drops all sessions
async fn set_user_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SetUserStatusRequest>,
) -> Result<ApiResponse<User>, ApiError> {
    Ok(ApiResponse::ok(
        state.user_service.set_status(id, body.status).await?,
    ))
}

// ---- Courses ----

/// GET /api/v1/admin/courses - all courses regardless of status
async fn list_all_courses(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<ApiResponse<PagedResult<Course>>, ApiError> {
    Ok(ApiResponse::ok(
        state.course_service.list_all(&query.params()).await?,
    ))
}

// ---- Categories ----

/// POST /api/v1/admin/categories
async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryInput>,
) -> Result<ApiResponse<CourseCategory>, ApiError> {
    Ok(ApiResponse::created(
        state.course_service.create_category(input).await?,
    ))
}

/// PUT /api/v1/admin/categories/{id}
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateCategoryInput>,
) -> Result<ApiResponse<CourseCategory>, ApiError> {
    Ok(ApiResponse::ok(
        state.course_service.update_category(id, input).await?,
    ))
}

/// DELETE /api/v1/admin/categories/{id}
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state.course_service.delete_category(id).await?;
    Ok(ApiResponse::ok(serde_json::json!({})).with_message("Category deleted"))
}

// ---- Payments ----

/// GET /api/v1/admin/payments
async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<ApiResponse<PagedResult<Payment>>, ApiError> {
    Ok(ApiResponse::ok(
        state.payment_service.list(&query.params()).await?,
    ))
}

/// PUT /api/v1/admin/payments/{id}/status
///
/// Marking a payment completed activates the matching enrollment and
/// bumps the course's enrolled count.
async fn set_payment_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SetPaymentStatusRequest>,
) -> Result<ApiResponse<Payment>, ApiError> {
    Ok(ApiResponse::ok(
        state
            .payment_service
            .set_status(id, body.status, body.reason.as_deref())
            .await?,
    ))
}

// ---- Settings ----

/// GET /api/v1/admin/settings - typed site settings with defaults
async fn get_settings(
    State(state): State<AppState>,
) -> Result<ApiResponse<SiteSettings>, ApiError> {
    Ok(ApiResponse::ok(
        state.settings_service.get_site_settings().await?,
    ))
}

/// PUT /api/v1/admin/settings
async fn update_settings(
    State(state): State<AppState>,
    Json(settings): Json<SiteSettings>,
) -> Result<ApiResponse<SiteSettings>, ApiError> {
    state.settings_service.update_site_settings(&settings).await?;
    Ok(ApiResponse::ok(settings))
}

/// GET /api/v1/admin/settings/raw - every stored key/value pair
async fn list_raw_settings(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Setting>>, ApiError> {
    Ok(ApiResponse::ok(state.settings_service.get_all().await?))
}

// ---- Content blocks ----

/// GET /api/v1/admin/content
async fn list_content(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ContentBlock>>, ApiError> {
    Ok(ApiResponse::ok(state.content_service.list().await?))
}

/// PUT /api/v1/admin/content/{key} - upsert and invalidate the cache entry
async fn upsert_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<serde_json::Value>,
) -> Result<ApiResponse<ContentBlock>, ApiError> {
    Ok(ApiResponse::ok(
        state.content_service.upsert(&key, value).await?,
    ))
}

/// DELETE /api/v1/admin/content/{key}
async fn delete_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    state.content_service.delete(&key).await?;
    Ok(ApiResponse::ok(serde_json::json!({})).with_message("Content block deleted"))
}

// ---- Stats ----

/// GET /api/v1/admin/stats
async fn stats(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<ApiResponse<StatsResponse>, ApiError> {
    let users = state
        .user_repo
        .count()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    let courses = state
        .course_repo
        .count()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    let enrollments = state
        .enrollment_repo
        .count()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    let revenue_total = state.payment_service.revenue_total().await?;

    Ok(ApiResponse::ok(StatsResponse {
        users,
        courses,
        enrollments,
        revenue_total,
        total_requests: state.request_stats.total_requests(),
        avg_response_time_us: state.request_stats.avg_response_time_us(),
        uptime_seconds: state.request_stats.uptime_seconds(),
    }))
}
