//! Public catalog API endpoints
//!
//! - GET /api/v1/courses - published catalog with pagination and filters
//! - GET /api/v1/courses/{slug} - course detail with outline and FAQs
//! - GET /api/v1/courses/{slug}/reviews - paginated reviews
//! - GET /api/v1/categories - category list
//! - GET /api/v1/content/{key} - CMS content block

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Router,
};

use crate::api::common::{CatalogQuery, PaginationQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{ApiResponse, ChapterView, CourseDetailResponse};
use crate::models::{ContentBlock, Course, CourseCategory, CourseReview, PagedResult};

/// Build the public catalog router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/{slug}", get(get_course))
        .route("/courses/{slug}/reviews", get(list_reviews))
        .route("/categories", get(list_categories))
        .route("/content/{key}", get(get_content))
}

/// GET /api/v1/courses - published catalog
async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<ApiResponse<PagedResult<Course>>, ApiError> {
    let (params, filter) = query.into_parts();
    let page = state.course_service.list_published(&params, &filter).await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/v1/courses/{slug} - published course detail
async fn get_course(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<CourseDetailResponse>, ApiError> {
    let course = state.course_service.get_published_by_slug(&slug).await?;

    let outline = state
        .course_service
        .outline(course.id)
        .await?
        .into_iter()
        .map(ChapterView::from)
        .collect();
    let faqs = state.course_service.list_faqs(course.id).await?;

    let category = match course.category_id {
        Some(category_id) => state
            .course_service
            .list_categories()
            .await?
            .into_iter()
            .find(|c| c.id == category_id),
        None => None,
    };

    Ok(ApiResponse::ok(CourseDetailResponse {
        course,
        category,
        outline,
        faqs,
    }))
}

/// GET /api/v1/courses/{slug}/reviews - reviews of a published course
async fn list_reviews(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> Result<ApiResponse<PagedResult<CourseReview>>, ApiError> {
    let course = state.course_service.get_published_by_slug(&slug).await?;
    let page = state
        .review_service
        .list_by_course(course.id, &query.params())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/v1/categories
async fn list_categories(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CourseCategory>>, ApiError> {
    Ok(ApiResponse::ok(state.course_service.list_categories().await?))
}

/// GET /api/v1/content/{key} - CMS content block, served through the cache
async fn get_content(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<ApiResponse<ContentBlock>, ApiError> {
    Ok(ApiResponse::ok(state.content_service.get(&key).await?))
}
