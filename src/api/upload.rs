//! Upload API endpoints
//!
//! Handles image uploads for course thumbnails and lesson attachments.
//! Files get uuid names and are served from `/uploads`.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Router,
};
use serde::Serialize;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::ApiResponse;

/// Response for a successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub content_type: String,
}

/// Build the upload router (mounted behind the auth middleware)
pub fn router() -> Router<AppState> {
    Router::new().route("/image", post(upload_image))
}

/// POST /api/v1/upload/image - upload a single image
///
/// Accepts multipart/form-data with a single file field named "file".
async fn upload_image(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<ApiResponse<UploadResponse>, ApiError> {
    let config = &state.upload_config;

    ensure_upload_dir(&config.path).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" {
            continue;
        }

        let content_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !config.is_type_allowed(&content_type) {
            return Err(ApiError::validation_error(format!(
                "Invalid file type: {}. Allowed types: {:?}",
                content_type, config.allowed_types
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to read file: {}", e)))?;

        if data.len() as u64 > config.max_file_size {
            return Err(ApiError::validation_error(format!(
                "File too large. Maximum size: {} bytes ({} MB)",
                config.max_file_size,
                config.max_file_size / 1024 / 1024
            )));
        }

        let ext = config.get_extension(&content_type);
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let file_path = config.path.join(&filename);

        fs::write(&file_path, &data)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to save file: {}", e)))?;

        return Ok(ApiResponse::created(UploadResponse {
            url: format!("/uploads/{}", filename),
            filename,
            size: data.len() as u64,
            content_type,
        }));
    }

    Err(ApiError::validation_error("No file provided"))
}

/// Ensure the upload directory exists
async fn ensure_upload_dir(path: &Path) -> Result<(), ApiError> {
    if !path.exists() {
        fs::create_dir_all(path)
            .await
            .map_err(|e| ApiError::internal_error(format!("Failed to create upload dir: {}", e)))?;
    }
    Ok(())
}
