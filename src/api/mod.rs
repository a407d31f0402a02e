//! API layer - HTTP handlers and routing
//!
//! All HTTP endpoints for coursehub, grouped by audience:
//! - Public catalog, auth, and payment callback endpoints
//! - Authenticated endpoints (profile, uploads)
//! - Student endpoints (enrollments, lessons, quizzes, reviews)
//! - Instructor endpoints (course management)
//! - Admin endpoints (users, payments, settings, content, stats)

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod common;
pub mod instructor;
pub mod middleware;
pub mod payments;
pub mod responses;
pub mod student;
pub mod upload;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use middleware::{ApiError, AppState, RequestStats};
pub use responses::ApiResponse;

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Instructor routes (need instructor or admin role)
    let instructor_routes = Router::new()
        .nest("/instructor", instructor::router())
        .route_layer(axum_middleware::from_fn(middleware::require_instructor))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Student routes (any authenticated user can enroll and learn)
    let student_routes = Router::new()
        .nest("/student", student::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need auth but no specific role)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/upload", upload::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .merge(catalog::router())
        .nest("/auth", auth::public_router())
        .nest("/payments", payments::router())
        .merge(protected_routes)
        .merge(student_routes)
        .merge(instructor_routes)
        .merge(admin_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
            .allow_credentials(true),
        Err(_) => {
            tracing::warn!(cors_origin, "Invalid CORS origin, falling back to defaults");
            CorsLayer::new()
        }
    };

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .nest_service(
            "/uploads",
            ServeDir::new(state.upload_config.path.clone()),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Outermost layer, runs for all requests
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .with_state(state)
}
