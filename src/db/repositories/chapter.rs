//! Chapter repository
//!
//! Database operations for course chapters.

use crate::models::Chapter;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Chapter repository trait
#[async_trait]
pub trait ChapterRepository: Send + Sync {
    /// Create a new chapter
    async fn create(&self, chapter: &Chapter) -> Result<Chapter>;

    /// Get chapter by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Chapter>>;

    /// List chapters of a course in sort order
    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Chapter>>;

    /// Update a chapter
    async fn update(&self, chapter: &Chapter) -> Result<Chapter>;

    /// Delete a chapter
    async fn delete(&self, id: i64) -> Result<()>;

    /// Highest sort order in a course, None when the course has no chapters
    async fn max_sort_order(&self, course_id: i64) -> Result<Option<i32>>;
}

/// SQLx-based chapter repository implementation
pub struct SqlxChapterRepository {
    pool: SqlitePool,
}

impl SqlxChapterRepository {
    /// Create a new SQLx chapter repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ChapterRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ChapterRepository for SqlxChapterRepository {
    async fn create(&self, chapter: &Chapter) -> Result<Chapter> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO chapters (course_id, title, sort_order, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(chapter.course_id)
        .bind(&chapter.title)
        .bind(chapter.sort_order)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create chapter")?;

        Ok(Chapter {
            id: result.last_insert_rowid(),
            course_id: chapter.course_id,
            title: chapter.title.clone(),
            sort_order: chapter.sort_order,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Chapter>> {
        get_chapter_by_id(&self.pool, id).await
    }

    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Chapter>> {
        let rows = sqlx::query(
            r#"
            SELECT id, course_id, title, sort_order, created_at
            FROM chapters
            WHERE course_id = ?
            ORDER BY sort_order, id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list chapters")?;

        Ok(rows.iter().map(row_to_chapter).collect())
    }

    async fn update(&self, chapter: &Chapter) -> Result<Chapter> {
        sqlx::query("UPDATE chapters SET title = ?, sort_order = ? WHERE id = ?")
            .bind(&chapter.title)
            .bind(chapter.sort_order)
            .bind(chapter.id)
            .execute(&self.pool)
            .await
            .context("Failed to update chapter")?;

        get_chapter_by_id(&self.pool, chapter.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Chapter not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM chapters WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete chapter")?;
        Ok(())
    }

    async fn max_sort_order(&self, course_id: i64) -> Result<Option<i32>> {
        let row = sqlx::query("SELECT MAX(sort_order) as max_order FROM chapters WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to get max chapter sort order")?;
        Ok(row.get("max_order"))
    }
}

async fn get_chapter_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Chapter>> {
    let row = sqlx::query(
        r#"
        SELECT id, course_id, title, sort_order, created_at
        FROM chapters
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get chapter by ID")?;

    Ok(row.as_ref().map(row_to_chapter))
}

fn row_to_chapter(row: &sqlx::sqlite::SqliteRow) -> Chapter {
    Chapter {
        id: row.get("id"),
        course_id: row.get("course_id"),
        title: row.get("title"),
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
        let instructor_id = create_instructor(&pool, "chap_inst").await;
        let course_repo = SqlxCourseRepository::new(pool.clone());
        let course = course_repo
            .create(&test_course("chap-course", instructor_id, CourseStatus::Draft))
            .await
            .expect("Failed to create course");
        (pool, course.id)
    }

    fn test_chapter(course_id: i64, title: &str, sort_order: i32) -> Chapter {
        Chapter {
            id: 0,
            course_id,
            title: title.to_string(),
            sort_order,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_ordered() {
        let (pool, course_id) = setup().await;
        let repo = SqlxChapterRepository::new(pool);

        repo.create(&test_chapter(course_id, "Second", 1)).await.unwrap();
        repo.create(&test_chapter(course_id, "First", 0)).await.unwrap();

        let chapters = repo.list_by_course(course_id).await.expect("Failed to list");
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "First");
        assert_eq!(chapters[1].title, "Second");
    }

    #[tokio::test]
    async fn test_max_sort_order() {
        let (pool, course_id) = setup().await;
        let repo = SqlxChapterRepository::new(pool);

        assert_eq!(repo.max_sort_order(course_id).await.unwrap(), None);

        repo.create(&test_chapter(course_id, "A", 3)).await.unwrap();
        repo.create(&test_chapter(course_id, "B", 7)).await.unwrap();

        assert_eq!(repo.max_sort_order(course_id).await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (pool, course_id) = setup().await;
        let repo = SqlxChapterRepository::new(pool);

        let mut chapter = repo
            .create(&test_chapter(course_id, "Before", 0))
            .await
            .unwrap();

        chapter.title = "After".to_string();
        chapter.sort_order = 5;
        let updated = repo.update(&chapter).await.expect("Failed to update");
        assert_eq!(updated.title, "After");
        assert_eq!(updated.sort_order, 5);

        repo.delete(chapter.id).await.expect("Failed to delete");
        assert!(repo.get_by_id(chapter.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cascade_delete_with_course() {
        let (pool, course_id) = setup().await;
        let repo = SqlxChapterRepository::new(pool.clone());
        let chapter = repo
            .create(&test_chapter(course_id, "Orphan", 0))
            .await
            .unwrap();

        let course_repo = SqlxCourseRepository::new(pool);
        course_repo.delete(course_id).await.expect("Failed to delete course");

        assert!(repo.get_by_id(chapter.id).await.unwrap().is_none());
    }
}
