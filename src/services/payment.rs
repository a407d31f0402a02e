//! Payment service
//!
//! Business logic for payment state transitions. The gateway talks to us via
//! redirect callbacks keyed by the checkout reference; completion happens
//! through the admin endpoint. A payment that has left the initiated state
//! is finalized and never changes again.

use crate::cache::{CacheLayer, MemoryCache};
use crate::db::repositories::{CourseRepository, EnrollmentRepository, PaymentRepository};
use crate::models::{EnrollmentStatus, ListParams, PagedResult, Payment, PaymentStatus};
use anyhow::Context;
use std::sync::Arc;

/// Error types for payment service operations
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Payment not found
    #[error("Payment not found")]
    NotFound,

    /// Payment already left the initiated state
    #[error("Payment is already finalized")]
    AlreadyFinalized,

    /// Invalid target status
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Payment service
pub struct PaymentService {
    payment_repo: Arc<dyn PaymentRepository>,
    enrollment_repo: Arc<dyn EnrollmentRepository>,
    course_repo: Arc<dyn CourseRepository>,
    cache: Arc<MemoryCache>,
}

impl PaymentService {
    /// Create a new payment service
    pub fn new(
        payment_repo: Arc<dyn PaymentRepository>,
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        course_repo: Arc<dyn CourseRepository>,
        cache: Arc<MemoryCache>,
    ) -> Self {
        Self {
            payment_repo,
            enrollment_repo,
            course_repo,
            cache,
        }
    }

    /// Gateway cancel callback.
    ///
    /// Marks the payment cancelled; the enrollment stays pending so the
    /// student can retry.
    pub async fn callback_cancel(&self, reference: &str) -> Result<Payment, PaymentError> {
        self.finalize_by_reference(reference, PaymentStatus::Cancelled, None)
            .await
    }

    /// Gateway failure callback
    pub async fn callback_fail(
        &self,
        reference: &str,
        reason: Option<&str>,
    ) -> Result<Payment, PaymentError> {
        self.finalize_by_reference(reference, PaymentStatus::Failed, reason)
            .await
    }

    /// List payments, newest first (admin operation)
    pub async fn list(&self, params: &ListParams) -> Result<PagedResult<Payment>, PaymentError> {
        Ok(self
            .payment_repo
            .list(params)
            .await
            .context("Failed to list payments")?)
    }

    /// Get payment by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Payment, PaymentError> {
        self.payment_repo
            .get_by_id(id)
            .await
            .context("Failed to get payment")?
            .ok_or(PaymentError::NotFound)
    }

    /// Manually set the status of an initiated payment (admin operation).
    ///
    /// Marking a payment completed activates the matching enrollment and
    /// bumps the course's enrolled count, as two sequential writes.
    pub async fn set_status(
        &self,
        id: i64,
        status: PaymentStatus,
        reason: Option<&str>,
    ) -> Result<Payment, PaymentError> {
        if status == PaymentStatus::Initiated {
            return Err(PaymentError::ValidationError(
                "Cannot move a payment back to initiated".to_string(),
            ));
        }

        let payment = self.get_by_id(id).await?;
        if payment.is_finalized() {
            return Err(PaymentError::AlreadyFinalized);
        }

        self.payment_repo
            .update_status(id, status, reason)
            .await
            .context("Failed to update payment status")?;

        if status == PaymentStatus::Completed {
            self.activate_enrollment(&payment).await?;
        }

        tracing::info!(payment_id = id, status = %status, "Payment status updated");
        self.get_by_id(id).await
    }

    /// Total completed revenue in minor units
    pub async fn revenue_total(&self) -> Result<i64, PaymentError> {
        Ok(self
            .payment_repo
            .revenue_total()
            .await
            .context("Failed to sum revenue")?)
    }

    async fn finalize_by_reference(
        &self,
        reference: &str,
        status: PaymentStatus,
        reason: Option<&str>,
    ) -> Result<Payment, PaymentError> {
        let payment = self
            .payment_repo
            .get_by_reference(reference)
            .await
            .context("Failed to get payment by reference")?
            .ok_or(PaymentError::NotFound)?;

        if payment.is_finalized() {
            return Err(PaymentError::AlreadyFinalized);
        }

        self.payment_repo
            .update_status(payment.id, status, reason)
            .await
            .context("Failed to update payment status")?;

        tracing::info!(payment_id = payment.id, status = %status, "Payment callback processed");
        self.get_by_id(payment.id).await
    }

    async fn activate_enrollment(&self, payment: &Payment) -> Result<(), PaymentError> {
        let enrollment = self
            .enrollment_repo
            .get_by_student_and_course(payment.student_id, payment.course_id)
            .await
            .context("Failed to get enrollment")?;

        match enrollment {
            Some(enrollment) if !enrollment.is_active() => {
                self.enrollment_repo
                    .update_status(enrollment.id, EnrollmentStatus::Active)
                    .await
                    .context("Failed to activate enrollment")?;
                self.course_repo
                    .increment_enrolled_count(payment.course_id)
                    .await
                    .context("Failed to increment enrolled count")?;
                let _ = self.cache.delete_pattern("courses:*").await;
                tracing::info!(
                    enrollment_id = enrollment.id,
                    course_id = payment.course_id,
                    "Enrollment activated by payment"
                );
            }
            Some(_) => {}
            None => {
                tracing::warn!(
                    payment_id = payment.id,
                    student_id = payment.student_id,
                    course_id = payment.course_id,
                    "Completed payment has no matching enrollment"
                );
            }
        }
        Ok(())
    }
}
