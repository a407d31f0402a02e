//! Payment gateway callback endpoints
//!
//! The gateway redirects the student's browser back with the checkout
//! reference; these endpoints record the abandoned or rejected outcome.
//! Completion is never reported here, an admin confirms it manually.
//!
//! - POST /api/v1/payments/callback/cancel
//! - POST /api/v1/payments/callback/fail

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::ApiResponse;
use crate::models::Payment;

/// Request body for the cancel callback
#[derive(Debug, Deserialize)]
pub struct CancelCallback {
    pub reference: String,
}

/// Request body for the fail callback
#[derive(Debug, Deserialize)]
pub struct FailCallback {
    pub reference: String,
    pub reason: Option<String>,
}

/// Build the payment callback router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/callback/cancel", post(callback_cancel))
        .route("/callback/fail", post(callback_fail))
}

/// POST /api/v1/payments/callback/cancel - checkout abandoned
async fn callback_cancel(
    State(state): State<AppState>,
    Json(body): Json<CancelCallback>,
) -> Result<ApiResponse<Payment>, ApiError> {
    let payment = state.payment_service.callback_cancel(&body.reference).await?;
    Ok(ApiResponse::ok(payment))
}

/// POST /api/v1/payments/callback/fail - gateway rejected the payment
async fn callback_fail(
    State(state): State<AppState>,
    Json(body): Json<FailCallback>,
) -> Result<ApiResponse<Payment>, ApiError> {
    let payment = state
        .payment_service
        .callback_fail(&body.reference, body.reason.as_deref())
        .await?;
    Ok(ApiResponse::ok(payment))
}
