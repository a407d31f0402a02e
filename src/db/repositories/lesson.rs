//! Lesson repository
//!
//! Database operations for lessons.

use crate::models::Lesson;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Lesson repository trait
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Create a new lesson
    async fn create(&self, lesson: &Lesson) -> Result<Lesson>;

    /// Get lesson by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Lesson>>;

    /// List lessons of a chapter in sort order
    async fn list_by_chapter(&self, chapter_id: i64) -> Result<Vec<Lesson>>;

    /// List all lessons of a course in chapter/lesson sort order
    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Lesson>>;

    /// Number of lessons in a course
    async fn count_by_course(&self, course_id: i64) -> Result<i64>;

    /// Update a lesson
    async fn update(&self, lesson: &Lesson) -> Result<Lesson>;

    /// Delete a lesson
    async fn delete(&self, id: i64) -> Result<()>;

    /// Highest sort order in a chapter, None when the chapter has no lessons
    async fn max_sort_order(&self, chapter_id: i64) -> Result<Option<i32>>;
}

/// SQLx-based lesson repository implementation
pub struct SqlxLessonRepository {
    pool: SqlitePool,
}

impl SqlxLessonRepository {
    /// Create a new SQLx lesson repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn LessonRepository> {
        Arc::new(Self::new(pool))
    }
}

const LESSON_COLUMNS: &str = "id, chapter_id, course_id, title, content, video_url, \
     duration_minutes, is_free_preview, sort_order, created_at, updated_at";

#[async_trait]
impl LessonRepository for SqlxLessonRepository {
    async fn create(&self, lesson: &Lesson) -> Result<Lesson> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO lessons
                (chapter_id, course_id, title, content, video_url, duration_minutes,
                 is_free_preview, sort_order, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(lesson.chapter_id)
        .bind(lesson.course_id)
        .bind(&lesson.title)
        .bind(&lesson.content)
        .bind(&lesson.video_url)
        .bind(lesson.duration_minutes)
        .bind(lesson.is_free_preview)
        .bind(lesson.sort_order)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create lesson")?;

        let id = result.last_insert_rowid();
        get_lesson_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Lesson not found after create"))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Lesson>> {
        get_lesson_by_id(&self.pool, id).await
    }

    async fn list_by_chapter(&self, chapter_id: i64) -> Result<Vec<Lesson>> {
        let sql = format!(
            "SELECT {} FROM lessons WHERE chapter_id = ? ORDER BY sort_order, id",
            LESSON_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(chapter_id)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list lessons by chapter")?;

        Ok(rows.iter().map(row_to_lesson).collect())
    }

    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Lesson>> {
        // Ordered by the owning chapter first so course outlines come out in
        // reading order.
        let rows = sqlx::query(
            r#"
            SELECT l.id, l.chapter_id, l.course_id, l.title, l.content, l.video_url,
                   l.duration_minutes, l.is_free_preview, l.sort_order, l.created_at, l.updated_at
            FROM lessons l
            INNER JOIN chapters c ON c.id = l.chapter_id
            WHERE l.course_id = ?
            ORDER BY c.sort_order, c.id, l.sort_order, l.id
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list lessons by course")?;

        Ok(rows.iter().map(row_to_lesson).collect())
    }

    async fn count_by_course(&self, course_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM lessons WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count lessons")?;
        Ok(row.get("count"))
    }

    async fn update(&self, lesson: &Lesson) -> Result<Lesson> {
        sqlx::query(
            r#"
            UPDATE lessons
            SET title = ?, content = ?, video_url = ?, duration_minutes = ?,
                is_free_preview = ?, sort_order = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&lesson.title)
        .bind(&lesson.content)
        .bind(&lesson.video_url)
        .bind(lesson.duration_minutes)
        .bind(lesson.is_free_preview)
        .bind(lesson.sort_order)
        .bind(Utc::now())
        .bind(lesson.id)
        .execute(&self.pool)
        .await
        .context("Failed to update lesson")?;

        get_lesson_by_id(&self.pool, lesson.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Lesson not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM lessons WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete lesson")?;
        Ok(())
    }

    async fn max_sort_order(&self, chapter_id: i64) -> Result<Option<i32>> {
        let row = sqlx::query("SELECT MAX(sort_order) as max_order FROM lessons WHERE chapter_id = ?")
            .bind(chapter_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to get max lesson sort order")?;
        Ok(row.get("max_order"))
    }
}

async fn get_lesson_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Lesson>> {
    let sql = format!("SELECT {} FROM lessons WHERE id = ?", LESSON_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get lesson by ID")?;

    Ok(row.as_ref().map(row_to_lesson))
}

fn row_to_lesson(row: &sqlx::sqlite::SqliteRow) -> Lesson {
    Lesson {
        id: row.get("id"),
        chapter_id: row.get("chapter_id"),
        course_id: row.get("course_id"),
        title: row.get("title"),
        content: row.get("content"),
        video_url: row.get("video_url"),
        duration_minutes: row.get("duration_minutes"),
        is_free_preview: row.get("is_free_preview"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::repositories::course::tests::{create_instructor, setup_pool, test_course};
    use crate::db::repositories::{
        ChapterRepository, CourseRepository, SqlxChapterRepository, SqlxCourseRepository,
    };
    use crate::models::{Chapter, CourseStatus};

    pub(crate) async fn setup_course_with_chapter(pool: &SqlitePool) -> (i64, i64) {
        let instructor_id = create_instructor(pool, "lesson_inst").await;
        let course_repo = SqlxCourseRepository::new(pool.clone());
        let course = course_repo
            .create(&test_course("lesson-course", instructor_id, CourseStatus::Published))
            .await
            .expect("Failed to create course");

        let chapter_repo = SqlxChapterRepository::new(pool.clone());
        let chapter = chapter_repo
            .create(&Chapter {
                id: 0,
                course_id: course.id,
                title: "Chapter 1".to_string(),
                sort_order: 0,
                created_at: Utc::now(),
            })
            .await
            .expect("Failed to create chapter");

        (course.id, chapter.id)
    }

    pub(crate) fn test_lesson(chapter_id: i64, course_id: i64, title: &str, sort_order: i32) -> Lesson {
        let now = Utc::now();
        Lesson {
            id: 0,
            chapter_id,
            course_id,
            title: title.to_string(),
            content: "Lesson body".to_string(),
            video_url: String::new(),
            duration_minutes: 10,
            is_free_preview: false,
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_lessons() {
        let pool = setup_pool().await;
        let (course_id, chapter_id) = setup_course_with_chapter(&pool).await;
        let repo = SqlxLessonRepository::new(pool);

        repo.create(&test_lesson(chapter_id, course_id, "B", 1)).await.unwrap();
        repo.create(&test_lesson(chapter_id, course_id, "A", 0)).await.unwrap();

        let lessons = repo.list_by_chapter(chapter_id).await.expect("Failed to list");
        assert_eq!(lessons.len(), 2);
        assert_eq!(lessons[0].title, "A");

        assert_eq!(repo.count_by_course(course_id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_by_course_reading_order() {
        let pool = setup_pool().await;
        let (course_id, first_chapter) = setup_course_with_chapter(&pool).await;

        let chapter_repo = SqlxChapterRepository::new(pool.clone());
        let second_chapter = chapter_repo
            .create(&Chapter {
                id: 0,
                course_id,
                title: "Chapter 2".to_string(),
                sort_order: 1,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let repo = SqlxLessonRepository::new(pool);
        repo.create(&test_lesson(second_chapter.id, course_id, "2.1", 0)).await.unwrap();
        repo.create(&test_lesson(first_chapter, course_id, "1.2", 1)).await.unwrap();
        repo.create(&test_lesson(first_chapter, course_id, "1.1", 0)).await.unwrap();

        let lessons = repo.list_by_course(course_id).await.expect("Failed to list");
        let titles: Vec<&str> = lessons.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["1.1", "1.2", "2.1"]);
    }

    #[tokio::test]
    async fn test_update_lesson() {
        let pool = setup_pool().await;
        let (course_id, chapter_id) = setup_course_with_chapter(&pool).await;
        let repo = SqlxLessonRepository::new(pool);

        let mut lesson = repo
            .create(&test_lesson(chapter_id, course_id, "Before", 0))
            .await
            .unwrap();

        lesson.title = "After".to_string();
        lesson.is_free_preview = true;
        let updated = repo.update(&lesson).await.expect("Failed to update");
        assert_eq!(updated.title, "After");
        assert!(updated.is_free_preview);
    }

    #[tokio::test]
    async fn test_delete_lesson() {
        let pool = setup_pool().await;
        let (course_id, chapter_id) = setup_course_with_chapter(&pool).await;
        let repo = SqlxLessonRepository::new(pool);

        let lesson = repo
            .create(&test_lesson(chapter_id, course_id, "Gone", 0))
            .await
            .unwrap();
        repo.delete(lesson.id).await.expect("Failed to delete");
        assert!(repo.get_by_id(lesson.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_max_sort_order() {
        let pool = setup_pool().await;
        let (course_id, chapter_id) = setup_course_with_chapter(&pool).await;
        let repo = SqlxLessonRepository::new(pool);

        assert_eq!(repo.max_sort_order(chapter_id).await.unwrap(), None);
        repo.create(&test_lesson(chapter_id, course_id, "L", 4)).await.unwrap();
        assert_eq!(repo.max_sort_order(chapter_id).await.unwrap(), Some(4));
    }
}
