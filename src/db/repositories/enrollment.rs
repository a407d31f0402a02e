//! Enrollment repository
//!
//! Database operations for enrollments. The completed lesson list is stored
//! as a JSON array on the row and mapped to `Vec<i64>` here.

use crate::models::{Enrollment, EnrollmentStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Enrollment repository trait
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Create a new enrollment
    async fn create(&self, enrollment: &Enrollment) -> Result<Enrollment>;

    /// Get enrollment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Enrollment>>;

    /// Get a student's enrollment in a course
    async fn get_by_student_and_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>>;

    /// List all enrollments of a student, newest first
    async fn list_by_student(&self, student_id: i64) -> Result<Vec<Enrollment>>;

    /// Update only the status
    async fn update_status(&self, id: i64, status: EnrollmentStatus) -> Result<()>;

    /// Replace the completed lesson list
    async fn set_completed_lessons(&self, id: i64, lessons: &[i64]) -> Result<()>;

    /// Total number of enrollments
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based enrollment repository implementation
pub struct SqlxEnrollmentRepository {
    pool: SqlitePool,
}

impl SqlxEnrollmentRepository {
    /// Create a new SQLx enrollment repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn EnrollmentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl EnrollmentRepository for SqlxEnrollmentRepository {
    async fn create(&self, enrollment: &Enrollment) -> Result<Enrollment> {
        let now = Utc::now();
        let completed = serde_json::to_string(&enrollment.completed_lessons)
            .context("Failed to serialize completed lessons")?;

        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (student_id, course_id, status, completed_lessons, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(enrollment.student_id)
        .bind(enrollment.course_id)
        .bind(enrollment.status.as_str())
        .bind(&completed)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create enrollment")?;

        Ok(Enrollment {
            id: result.last_insert_rowid(),
            student_id: enrollment.student_id,
            course_id: enrollment.course_id,
            status: enrollment.status,
            completed_lessons: enrollment.completed_lessons.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Enrollment>> {
        let row = sqlx::query(
            r#"
            SELECT id, student_id, course_id, status, completed_lessons, created_at, updated_at
            FROM enrollments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get enrollment by ID")?;

        match row {
            Some(row) => Ok(Some(row_to_enrollment(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_student_and_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>> {
        let row = sqlx::query(
            r#"
            SELECT id, student_id, course_id, status, completed_lessons, created_at, updated_at
            FROM enrollments
            WHERE student_id = ? AND course_id = ?
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get enrollment")?;

        match row {
            Some(row) => Ok(Some(row_to_enrollment(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_student(&self, student_id: i64) -> Result<Vec<Enrollment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, student_id, course_id, status, completed_lessons, created_at, updated_at
            FROM enrollments
            WHERE student_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list enrollments")?;

        let mut enrollments = Vec::new();
        for row in rows {
            enrollments.push(row_to_enrollment(&row)?);
        }
        Ok(enrollments)
    }

    async fn update_status(&self, id: i64, status: EnrollmentStatus) -> Result<()> {
        sqlx::query("UPDATE enrollments SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update enrollment status")?;
        Ok(())
    }

    async fn set_completed_lessons(&self, id: i64, lessons: &[i64]) -> Result<()> {
        let completed =
            serde_json::to_string(lessons).context("Failed to serialize completed lessons")?;

        sqlx::query("UPDATE enrollments SET completed_lessons = ?, updated_at = ? WHERE id = ?")
            .bind(&completed)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update completed lessons")?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM enrollments")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count enrollments")?;
        Ok(row.get("count"))
    }
}

fn row_to_enrollment(row: &sqlx::sqlite::SqliteRow) -> Result<Enrollment> {
    let status_str: String = row.get("status");
    let status = EnrollmentStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid enrollment status: {}", status_str))?;

    let completed_json: String = row.get("completed_lessons");
    let completed_lessons: Vec<i64> = serde_json::from_str(&completed_json)
        .context("Failed to parse completed lessons")?;

    Ok(Enrollment {
        id: row.get("id"),
        student_id: row.get("student_id"),
        course_id: row.get("course_id"),
        status,
        completed_lessons,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
