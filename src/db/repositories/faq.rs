//! Course FAQ repository
//!
//! Database operations for per-course FAQ entries.

use crate::models::CourseFaq;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

/// FAQ repository trait
#[async_trait]
pub trait FaqRepository: Send + Sync {
    /// Create a new FAQ entry
    async fn create(&self, faq: &CourseFaq) -> Result<CourseFaq>;

    /// Get FAQ entry by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<CourseFaq>>;

    /// List FAQ entries of a course in sort order
    async fn list_by_course(&self, course_id: i64) -> Result<Vec<CourseFaq>>;

    /// Update a FAQ entry
    async fn update(&self, faq: &CourseFaq) -> Result<CourseFaq>;

    /// Delete a FAQ entry
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based FAQ repository implementation
pub struct SqlxFaqRepository {
    pool: SqlitePool,
}

impl SqlxFaqRepository {
    /// Create a new SQLx FAQ repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn FaqRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl FaqRepository for SqlxFaqRepository {
    async fn create(&self, faq: &CourseFaq) -> Result<CourseFaq> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO course_faqs (course_id, question, answer, sort_order, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(faq.course_id)
        .bind(&faq.question)
        .bind(&faq.answer)
        .bind(faq.sort_order)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create FAQ")?;

        Ok(CourseFaq {
            id: result.last_insert_rowid(),
            course_id: faq.course_id,
            question: faq.question.clone(),
            answer: faq.answer.clone(),
            sort_order: faq.sort_order,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<CourseFaq>> {
        get_faq_by_id(&self.pool, id).await
    }

    async fn list_by_course(&self, course_id: i64) -> Result<Vec<CourseFaq>> {
        let rows = sqlx::query(
            r#"
            SELECT id, course_id, question, answer, sort_order, created_at
            FROM course_faqs
            WHERE course_id = ?
            ORDER BY sort_order, id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list FAQs")?;

        Ok(rows.iter().map(row_to_faq).collect())
    }

    async fn update(&self, faq: &CourseFaq) -> Result<CourseFaq> {
        sqlx::query("UPDATE course_faqs SET question = ?, answer = ?, sort_order = ? WHERE id = ?")
            .bind(&faq.question)
            .bind(&faq.answer)
            .bind(faq.sort_order)
            .bind(faq.id)
            .execute(&self.pool)
            .await
            .context("Failed to update FAQ")?;

        get_faq_by_id(&self.pool, faq.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("FAQ not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM course_faqs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete FAQ")?;
        Ok(())
    }
}

async fn get_faq_by_id(pool: &SqlitePool, id: i64) -> Result<Option<CourseFaq>> {
    let row = sqlx::query(
        r#"
        SELECT id, course_id, question, answer, sort_order, created_at
        FROM course_faqs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get FAQ by ID")?;

    Ok(row.as_ref().map(row_to_faq))
}

fn row_to_faq(row: &sqlx::sqlite::SqliteRow) -> CourseFaq {
    use sqlx::Row;
    CourseFaq {
        id: row.get("id"),
        course_id: row.get("course_id"),
        question: row.get("question"),
        answer: row.get("answer"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::course::tests::{create_instructor, setup_pool, test_course};
    use crate::db::repositories::{CourseRepository, SqlxCourseRepository};
    use crate::models::CourseStatus;

    async fn setup() -> (SqlitePool, i64) {
        let pool = setup_pool().await;
        let instructor_id = create_instructor(&pool, "faq_inst").await;
        let course_repo = SqlxCourseRepository::new(pool.clone());
        let course = course_repo
            .create(&test_course("faq-course", instructor_id, CourseStatus::Published))
            .await
            .expect("Failed to create course");
        (pool, course.id)
    }

    fn test_faq(course_id: i64, question: &str, sort_order: i32) -> CourseFaq {
        CourseFaq {
            id: 0,
            course_id,
            question: question.to_string(),
            answer: "Yes.".to_string(),
            sort_order,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_ordered() {
        let (pool, course_id) = setup().await;
        let repo = SqlxFaqRepository::new(pool);

        repo.create(&test_faq(course_id, "Second?", 1)).await.unwrap();
        repo.create(&test_faq(course_id, "First?", 0)).await.unwrap();

        let faqs = repo.list_by_course(course_id).await.expect("Failed to list");
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[0].question, "First?");
    }

    #[tokio::test]
    async fn test_update_faq() {
        let (pool, course_id) = setup().await;
        let repo = SqlxFaqRepository::new(pool);

        let mut faq = repo.create(&test_faq(course_id, "Before?", 0)).await.unwrap();
        faq.question = "After?".to_string();
        faq.answer = "Definitely.".to_string();

        let updated = repo.update(&faq).await.expect("Failed to update");
        assert_eq!(updated.question, "After?");
        assert_eq!(updated.answer, "Definitely.");
    }

    #[tokio::test]
    async fn test_delete_faq() {
        let (pool, course_id) = setup().await;
        let repo = SqlxFaqRepository::new(pool);

        let faq = repo.create(&test_faq(course_id, "Gone?", 0)).await.unwrap();
        repo.delete(faq.id).await.expect("Failed to delete");
        assert!(repo.get_by_id(faq.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cascade_delete_with_course() {
        let (pool, course_id) = setup().await;
        let repo = SqlxFaqRepository::new(pool.clone());
        let faq = repo.create(&test_faq(course_id, "Orphan?", 0)).await.unwrap();

        let course_repo = SqlxCourseRepository::new(pool);
        course_repo.delete(course_id).await.expect("Failed to delete course");

        assert!(repo.get_by_id(faq.id).await.unwrap().is_none());
    }
}
