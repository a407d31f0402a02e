//! Payment repository
//!
//! Database operations for payments. Lookups by gateway reference serve the
//! redirect callbacks; the revenue sum feeds the admin stats endpoint.

use crate::models::{ListParams, PagedResult, Payment, PaymentStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Payment repository trait
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Create a new payment
    async fn create(&self, payment: &Payment) -> Result<Payment>;

    /// Get payment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Payment>>;

    /// Get payment by gateway reference
    async fn get_by_reference(&self, reference: &str) -> Result<Option<Payment>>;

    /// List payments, newest first
    async fn list(&self, params: &ListParams) -> Result<PagedResult<Payment>>;

    /// Update status and failure reason
    async fn update_status(
        &self,
        id: i64,
        status: PaymentStatus,
        failure_reason: Option<&str>,
    ) -> Result<()>;

    /// Sum of completed payment amounts
    async fn revenue_total(&self) -> Result<i64>;
}

/// SQLx-based payment repository implementation
pub struct SqlxPaymentRepository {
    pool: SqlitePool,
}

impl SqlxPaymentRepository {
    /// Create a new SQLx payment repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PaymentRepository> {
        Arc::new(Self::new(pool))
    }
}

const PAYMENT_COLUMNS: &str = "id, student_id, course_id, amount, currency, gateway_reference, \
     status, failure_reason, created_at, updated_at";

#[async_trait]
impl PaymentRepository for SqlxPaymentRepository {
    async fn create(&self, payment: &Payment) -> Result<Payment> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO payments
                (student_id, course_id, amount, currency, gateway_reference, status,
                 failure_reason, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payment.student_id)
        .bind(payment.course_id)
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.gateway_reference)
        .bind(payment.status.as_str())
        .bind(&payment.failure_reason)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create payment")?;

        Ok(Payment {
            id: result.last_insert_rowid(),
            student_id: payment.student_id,
            course_id: payment.course_id,
            amount: payment.amount,
            currency: payment.currency.clone(),
            gateway_reference: payment.gateway_reference.clone(),
            status: payment.status,
            failure_reason: payment.failure_reason.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Payment>> {
        let sql = format!("SELECT {} FROM payments WHERE id = ?", PAYMENT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get payment by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_payment(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_reference(&self, reference: &str) -> Result<Option<Payment>> {
        let sql = format!(
            "SELECT {} FROM payments WHERE gateway_reference = ?",
            PAYMENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get payment by reference")?;

        match row {
            Some(row) => Ok(Some(row_to_payment(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<Payment>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) as count FROM payments")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count payments")?
            .get("count");

        let sql = format!(
            "SELECT {} FROM payments ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            PAYMENT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list payments")?;

        let mut payments = Vec::new();
        for row in rows {
            payments.push(row_to_payment(&row)?);
        }

        Ok(PagedResult::new(payments, total, params))
    }

    async fn update_status(
        &self,
        id: i64,
        status: PaymentStatus,
        failure_reason: Option<&str>,
    ) -> Result<()> {
        sqlx::query("UPDATE payments SET status = ?, failure_reason = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(failure_reason)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update payment status")?;
        Ok(())
    }

    async fn revenue_total(&self) -> Result<i64> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0) as total FROM payments WHERE status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to sum revenue")?;
        Ok(row.get("total"))
    }
}

fn row_to_payment(row: &sqlx::sqlite::SqliteRow) -> Result<Payment> {
    let status_str: String = row.get("status");
    let status = PaymentStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid payment status: {}", status_str))?;

    Ok(Payment {
        id: row.get("id"),
        student_id: row.get("student_id"),
        course_id: row.get("course_id"),
        amount: row.get("amount"),
        currency: row.get("currency"),
        gateway_reference: row.get("gateway_reference"),
        status,
        failure_reason: row.get("failure_reason"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::course::tests::{create_instructor, setup_pool, test_course};
    use crate::db::repositories::enrollment::tests::create_student;
    use crate::db::repositories::{CourseRepository, SqlxCourseRepository};
    use crate::models::CourseStatus;

    async fn setup() -> (SqlitePool, i64, i64) {
        let pool = setup_pool().await;
        let instructor_id = create_instructor(&pool, "pay_inst").await;
        let student_id = create_student(&pool, "pay_student").await;
        let course_repo = SqlxCourseRepository::new(pool.clone());
        let course = course_repo
            .create(&test_course("pay-course", instructor_id, CourseStatus::Published))
            .await
            .unwrap();
        (pool, student_id, course.id)
    }

    fn test_payment(student_id: i64, course_id: i64, reference: &str) -> Payment {
        let now = Utc::now();
        Payment {
            id: 0,
            student_id,
            course_id,
            amount: 4900,
            currency: "USD".to_string(),
            gateway_reference: reference.to_string(),
            status: PaymentStatus::Initiated,
            failure_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_reference() {
        let (pool, student_id, course_id) = setup().await;
        let repo = SqlxPaymentRepository::new(pool);

        let created = repo
            .create(&test_payment(student_id, course_id, "ref-abc"))
            .await
            .expect("Failed to create payment");
        assert!(created.id > 0);
        assert_eq!(created.status, PaymentStatus::Initiated);

        let found = repo
            .get_by_reference("ref-abc")
            .await
            .expect("Failed to get payment")
            .expect("Payment not found");
        assert_eq!(found.id, created.id);

        let missing = repo.get_by_reference("ref-missing").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_unique_reference_constraint() {
        let (pool, student_id, course_id) = setup().await;
        let repo = SqlxPaymentRepository::new(pool);

        repo.create(&test_payment(student_id, course_id, "ref-dup"))
            .await
            .expect("Failed to create payment");
        let result = repo.create(&test_payment(student_id, course_id, "ref-dup")).await;
        assert!(result.is_err(), "Should fail due to duplicate reference");
    }

    #[tokio::test]
    async fn test_update_status_with_reason() {
        let (pool, student_id, course_id) = setup().await;
        let repo = SqlxPaymentRepository::new(pool);

        let created = repo
            .create(&test_payment(student_id, course_id, "ref-fail"))
            .await
            .unwrap();

        repo.update_status(created.id, PaymentStatus::Failed, Some("card declined"))
            .await
            .expect("Failed to update status");

        let found = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.status, PaymentStatus::Failed);
        assert_eq!(found.failure_reason.as_deref(), Some("card declined"));
    }

    #[tokio::test]
    async fn test_revenue_counts_only_completed() {
        let (pool, student_id, course_id) = setup().await;
        let repo = SqlxPaymentRepository::new(pool);

        let done = repo
            .create(&test_payment(student_id, course_id, "ref-done"))
            .await
            .unwrap();
        repo.update_status(done.id, PaymentStatus::Completed, None)
            .await
            .unwrap();
        repo.create(&test_payment(student_id, course_id, "ref-open"))
            .await
            .unwrap();

        assert_eq!(repo.revenue_total().await.unwrap(), 4900);
    }

    #[tokio::test]
    async fn test_list_paginated() {
        let (pool, student_id, course_id) = setup().await;
        let repo = SqlxPaymentRepository::new(pool);

        for i in 0..3 {
            repo.create(&test_payment(student_id, course_id, &format!("ref-{}", i)))
                .await
                .unwrap();
        }

        let page = repo.list(&ListParams::new(1, 2)).await.expect("Failed to list");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
    }
}
