//! Course review repository
//!
//! Database operations for course reviews. The UNIQUE(student_id, course_id)
//! constraint enforces one review per student per course; rating aggregates
//! live on the course row and are maintained by the review service.

use crate::models::{CourseReview, ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Review repository trait
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Create a new review
    async fn create(&self, review: &CourseReview) -> Result<CourseReview>;

    /// Get a student's review of a course
    async fn get_by_student_and_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<CourseReview>>;

    /// List reviews of a course, newest first
    async fn list_by_course(
        &self,
        course_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<CourseReview>>;

    /// Update rating and comment of an existing review
    async fn update(&self, review: &CourseReview) -> Result<CourseReview>;

    /// Delete a review
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based review repository implementation
pub struct SqlxReviewRepository {
    pool: SqlitePool,
}

impl SqlxReviewRepository {
    /// Create a new SQLx review repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ReviewRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ReviewRepository for SqlxReviewRepository {
    async fn create(&self, review: &CourseReview) -> Result<CourseReview> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO course_reviews (student_id, course_id, rating, comment, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(review.student_id)
        .bind(review.course_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create review")?;

        Ok(CourseReview {
            id: result.last_insert_rowid(),
            student_id: review.student_id,
            course_id: review.course_id,
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_student_and_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<CourseReview>> {
        let row = sqlx::query(
            r#"
            SELECT id, student_id, course_id, rating, comment, created_at, updated_at
            FROM course_reviews
            WHERE student_id = ? AND course_id = ?
            "#,
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get review")?;

        Ok(row.as_ref().map(row_to_review))
    }

    async fn list_by_course(
        &self,
        course_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<CourseReview>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) as count FROM course_reviews WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count reviews")?
            .get("count");

        let rows = sqlx::query(
            r#"
            SELECT id, student_id, course_id, rating, comment, created_at, updated_at
            FROM course_reviews
            WHERE course_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(course_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list reviews")?;

        let reviews = rows.iter().map(row_to_review).collect();
        Ok(PagedResult::new(reviews, total, params))
    }

    async fn update(&self, review: &CourseReview) -> Result<CourseReview> {
        sqlx::query("UPDATE course_reviews SET rating = ?, comment = ?, updated_at = ? WHERE id = ?")
            .bind(review.rating)
            .bind(&review.comment)
            .bind(Utc::now())
            .bind(review.id)
            .execute(&self.pool)
            .await
            .context("Failed to update review")?;

        self.get_by_student_and_course(review.student_id, review.course_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Review not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM course_reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete review")?;
        Ok(())
    }
}

fn row_to_review(row: &sqlx::sqlite::SqliteRow) -> CourseReview {
    CourseReview {
        id: row.get("id"),
        student_id: row.get("student_id"),
        course_id: row.get("course_id"),
        rating: row.get("rating"),
        comment: row.get("comment"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
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
        let instructor_id = create_instructor(&pool, "rev_inst").await;
        let student_id = create_student(&pool, "rev_student").await;
        let course_repo = SqlxCourseRepository::new(pool.clone());
        let course = course_repo
            .create(&test_course("rev-course", instructor_id, CourseStatus::Published))
            .await
            .unwrap();
        (pool, student_id, course.id)
    }

    fn test_review(student_id: i64, course_id: i64, rating: i32) -> CourseReview {
        let now = Utc::now();
        CourseReview {
            id: 0,
            student_id,
            course_id,
            rating,
            comment: "Nice course".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (pool, student_id, course_id) = setup().await;
        let repo = SqlxReviewRepository::new(pool);

        let created = repo
            .create(&test_review(student_id, course_id, 5))
            .await
            .expect("Failed to create review");
        assert!(created.id > 0);

        let found = repo
            .get_by_student_and_course(student_id, course_id)
            .await
            .expect("Failed to get review")
            .expect("Review not found");
        assert_eq!(found.rating, 5);
    }

    #[tokio::test]
    async fn test_unique_pair_constraint() {
        let (pool, student_id, course_id) = setup().await;
        let repo = SqlxReviewRepository::new(pool);

        repo.create(&test_review(student_id, course_id, 4))
            .await
            .expect("Failed to create review");
        let result = repo.create(&test_review(student_id, course_id, 2)).await;
        assert!(result.is_err(), "Should fail due to duplicate review");
    }

    #[tokio::test]
    async fn test_update_review() {
        let (pool, student_id, course_id) = setup().await;
        let repo = SqlxReviewRepository::new(pool);

        let mut review = repo
            .create(&test_review(student_id, course_id, 3))
            .await
            .unwrap();
        review.rating = 5;
        review.comment = "Even better on a second pass".to_string();

        let updated = repo.update(&review).await.expect("Failed to update");
        assert_eq!(updated.rating, 5);
    }

    #[tokio::test]
    async fn test_list_by_course() {
        let (pool, student_id, course_id) = setup().await;
        let other_student = create_student(&pool, "rev_student2").await;
        let repo = SqlxReviewRepository::new(pool);

        repo.create(&test_review(student_id, course_id, 5)).await.unwrap();
        repo.create(&test_review(other_student, course_id, 3)).await.unwrap();

        let page = repo
            .list_by_course(course_id, &ListParams::default())
            .await
            .expect("Failed to list");
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_delete_review() {
        let (pool, student_id, course_id) = setup().await;
        let repo = SqlxReviewRepository::new(pool);

        let created = repo
            .create(&test_review(student_id, course_id, 4))
            .await
            .unwrap();
        repo.delete(created.id).await.expect("Failed to delete");

        assert!(repo
            .get_by_student_and_course(student_id, course_id)
            .await
            .unwrap()
            .is_none());
    }
}
