//! Authentication API endpoints
//!
//! - POST /api/v1/auth/register - registration (first user becomes admin)
//! - POST /api/v1/auth/login - login with session cookie + bearer token
//! - POST /api/v1/auth/logout
//! - GET  /api/v1/auth/me
//! - PUT  /api/v1/auth/profile
//! - PUT  /api/v1/auth/password

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::ApiResponse;
use crate::models::{UpdateUserInput, User};
use crate::services::password::verify_password;
use crate::services::{LoginInput, RegisterInput};

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username_or_email: String,
    pub password: String,
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// Request body for updating the own profile
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Request body for changing the own password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
        .route("/profile", put(update_profile))
        .route("/password", put(change_password))
}

fn session_cookie(token: &str, max_age_secs: i64) -> Result<HeaderValue, ApiError> {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token, max_age_secs
    );
    HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::internal_error(format!("Failed to build cookie: {}", e)))
}

/// POST /api/v1/auth/register - register and log the new user in
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let password = body.password.clone();
    let user = state.user_service.register(body).await?;

    let session = state
        .user_service
        .login(LoginInput {
            username_or_email: user.username.clone(),
            password,
        })
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie(&session.id, 7 * 24 * 60 * 60)?,
    );

    Ok((
        headers,
        ApiResponse::created(AuthResponse {
            user,
            token: session.id,
        }),
    ))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .user_service
        .login(LoginInput {
            username_or_email: body.username_or_email,
            password: body.password,
        })
        .await?;

    let user = state
        .user_service
        .validate_session(&session.id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Session validation failed"))?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        session_cookie(&session.id, 7 * 24 * 60 * 60)?,
    );

    Ok((
        headers,
        ApiResponse::ok(AuthResponse {
            user,
            token: session.id,
        }),
    ))
}

/// POST /api/v1/auth/logout
async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|h| h.to_str().ok())
                .and_then(|s| {
                    s.split(';')
                        .map(str::trim)
                        .find_map(|c| c.strip_prefix("session="))
                        .map(str::to_string)
                })
        })
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state.user_service.logout(&token).await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );

    Ok((
        response_headers,
        ApiResponse::ok(serde_json::json!({})).with_message("Logged out"),
    ))
}

/// GET /api/v1/auth/me
async fn get_current_user(user: AuthenticatedUser) -> ApiResponse<User> {
    ApiResponse::ok(user.0)
}

/// PUT /api/v1/auth/profile - change own username or email
async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<ApiResponse<User>, ApiError> {
    let updated = state
        .user_service
        .update_profile(
            user.0.id,
            UpdateUserInput {
                username: body.username,
                email: body.email,
                ..Default::default()
            },
        )
        .await?;

    Ok(ApiResponse::ok(updated))
}

/// PUT /api/v1/auth/password - change own password
async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let is_valid = verify_password(&body.current_password, &user.0.password_hash)
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    if !is_valid {
        return Err(ApiError::validation_error("Current password is incorrect"));
    }

    state
        .user_service
        .update_profile(
            user.0.id,
            UpdateUserInput {
                password: Some(body.new_password),
                ..Default::default()
            },
        )
        .await?;

    Ok(ApiResponse::ok(serde_json::json!({})).with_message("Password changed"))
}
