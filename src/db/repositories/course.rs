//! Course repository
//!
//! Database operations for courses, including the public catalog queries
//! and the denormalized counter updates (enrolled_count, rating aggregates).

use crate::models::{Course, CourseFilter, CourseStatus, ListParams, PagedResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Course repository trait
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Create a new course
    async fn create(&self, course: &Course) -> Result<Course>;

    /// Get course by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Course>>;

    /// Get course by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Course>>;

    /// List published courses for the public catalog
    async fn list_published(
        &self,
        params: &ListParams,
        filter: &CourseFilter,
    ) -> Result<PagedResult<Course>>;

    /// List an instructor's courses including drafts
    async fn list_by_instructor(
        &self,
        instructor_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Course>>;

    /// List all courses regardless of status
    async fn list_all(&self, params: &ListParams) -> Result<PagedResult<Course>>;

    /// Update a course
    async fn update(&self, course: &Course) -> Result<Course>;

    /// Delete a course
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a course slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;

    /// Bump the enrolled counter by one
    async fn increment_enrolled_count(&self, id: i64) -> Result<()>;

    /// Apply a delta to the review aggregates
    async fn apply_review_delta(&self, id: i64, sum_delta: i64, count_delta: i64) -> Result<()>;

    /// Total number of courses
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based course repository implementation
pub struct SqlxCourseRepository {
    pool: SqlitePool,
}

impl SqlxCourseRepository {
    /// Create a new SQLx course repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CourseRepository> {
        Arc::new(Self::new(pool))
    }
}

const COURSE_COLUMNS: &str = "id, slug, title, summary, description, thumbnail, price, currency, \
     instructor_id, category_id, status, enrolled_count, rating_sum, rating_count, \
     created_at, updated_at";

#[async_trait]
impl CourseRepository for SqlxCourseRepository {
    async fn create(&self, course: &Course) -> Result<Course> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO courses
                (slug, title, summary, description, thumbnail, price, currency,
                 instructor_id, category_id, status, enrolled_count, rating_sum,
                 rating_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, 0, ?, ?)
            "#,
        )
        .bind(&course.slug)
        .bind(&course.title)
        .bind(&course.summary)
        .bind(&course.description)
        .bind(&course.thumbnail)
        .bind(course.price)
        .bind(&course.currency)
        .bind(course.instructor_id)
        .bind(course.category_id)
        .bind(course.status.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create course")?;

        let id = result.last_insert_rowid();
        get_course_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Course not found after create"))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Course>> {
        get_course_by_id(&self.pool, id).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Course>> {
        let sql = format!("SELECT {} FROM courses WHERE slug = ?", COURSE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get course by slug")?;

        match row {
            Some(row) => Ok(Some(row_to_course(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_published(
        &self,
        params: &ListParams,
        filter: &CourseFilter,
    ) -> Result<PagedResult<Course>> {
        // Catalog filters are optional; build the WHERE clause once and use
        // it for both the count and the page query.
        let mut conditions = vec!["status = 'published'".to_string()];
        if filter.category_id.is_some() {
            conditions.push("category_id = ?".to_string());
        }
        if filter.search.is_some() {
            conditions.push("(title LIKE ? OR summary LIKE ?)".to_string());
        }
        let where_clause = conditions.join(" AND ");

        let search_term = filter.search.as_ref().map(|s| format!("%{}%", s));

        let count_sql = format!("SELECT COUNT(*) as count FROM courses WHERE {}", where_clause);
        let mut count_query = sqlx::query(&count_sql);
        if let Some(category_id) = filter.category_id {
            count_query = count_query.bind(category_id);
        }
        if let Some(ref term) = search_term {
            count_query = count_query.bind(term).bind(term);
        }
        let total: i64 = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count published courses")?
            .get("count");

        let page_sql = format!(
            "SELECT {} FROM courses WHERE {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            COURSE_COLUMNS, where_clause
        );
        let mut page_query = sqlx::query(&page_sql);
        if let Some(category_id) = filter.category_id {
            page_query = page_query.bind(category_id);
        }
        if let Some(ref term) = search_term {
            page_query = page_query.bind(term).bind(term);
        }
        let rows = page_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list published courses")?;

        let mut courses = Vec::new();
        for row in rows {
            courses.push(row_to_course(&row)?);
        }

        Ok(PagedResult::new(courses, total, params))
    }

    async fn list_by_instructor(
        &self,
        instructor_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Course>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) as count FROM courses WHERE instructor_id = ?")
            .bind(instructor_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count instructor courses")?
            .get("count");

        let sql = format!(
            "SELECT {} FROM courses WHERE instructor_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            COURSE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(instructor_id)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list instructor courses")?;

        let mut courses = Vec::new();
        for row in rows {
            courses.push(row_to_course(&row)?);
        }

        Ok(PagedResult::new(courses, total, params))
    }

    async fn list_all(&self, params: &ListParams) -> Result<PagedResult<Course>> {
        let total = self.count().await?;

        let sql = format!(
            "SELECT {} FROM courses ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            COURSE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list courses")?;

        let mut courses = Vec::new();
        for row in rows {
            courses.push(row_to_course(&row)?);
        }

        Ok(PagedResult::new(courses, total, params))
    }

    async fn update(&self, course: &Course) -> Result<Course> {
        sqlx::query(
            r#"
            UPDATE courses
            SET slug = ?, title = ?, summary = ?, description = ?, thumbnail = ?,
                price = ?, currency = ?, category_id = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&course.slug)
        .bind(&course.title)
        .bind(&course.summary)
        .bind(&course.description)
        .bind(&course.thumbnail)
        .bind(course.price)
        .bind(&course.currency)
        .bind(course.category_id)
        .bind(course.status.as_str())
        .bind(Utc::now())
        .bind(course.id)
        .execute(&self.pool)
        .await
        .context("Failed to update course")?;

        get_course_by_id(&self.pool, course.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Course not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM courses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete course")?;
        Ok(())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM courses WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check course slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn increment_enrolled_count(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE courses SET enrolled_count = enrolled_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to increment enrolled count")?;
        Ok(())
    }

    async fn apply_review_delta(&self, id: i64, sum_delta: i64, count_delta: i64) -> Result<()> {
        sqlx::query(
            "UPDATE courses SET rating_sum = rating_sum + ?, rating_count = rating_count + ? WHERE id = ?",
        )
        .bind(sum_delta)
        .bind(count_delta)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to apply review delta")?;
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM courses")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count courses")?;
        Ok(row.get("count"))
    }
}

async fn get_course_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Course>> {
    let sql = format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get course by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_course(&row)?)),
        None => Ok(None),
    }
}

fn row_to_course(row: &sqlx::sqlite::SqliteRow) -> Result<Course> {
    let status_str: String = row.get("status");
    let status = CourseStatus::from_str(&status_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid course status: {}", status_str))?;

    Ok(Course {
        id: row.get("id"),
        slug: row.get("slug"),
        title: row.get("title"),
        summary: row.get("summary"),
        description: row.get("description"),
        thumbnail: row.get("thumbnail"),
        price: row.get("price"),
        currency: row.get("currency"),
        instructor_id: row.get("instructor_id"),
        category_id: row.get("category_id"),
        status,
        enrolled_count: row.get("enrolled_count"),
        rating_sum: row.get("rating_sum"),
        rating_count: row.get("rating_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{User, UserRole};

    pub(crate) async fn setup_pool() -> SqlitePool {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        pool
    }

    pub(crate) async fn create_instructor(pool: &SqlitePool, username: &str) -> i64 {
        let repo = SqlxUserRepository::new(pool.clone());
        let user = repo
            .create(&User::new(
                username.to_string(),
                format!("{}@example.com", username),
                "hash".to_string(),
                UserRole::Instructor,
            ))
            .await
            .expect("Failed to create instructor");
        user.id
    }

    pub(crate) fn test_course(slug: &str, instructor_id: i64, status: CourseStatus) -> Course {
        let now = Utc::now();
        Course {
            id: 0,
            slug: slug.to_string(),
            title: format!("Course {}", slug),
            summary: "A summary".to_string(),
            description: "A description".to_string(),
            thumbnail: String::new(),
            price: 0,
            currency: "USD".to_string(),
            instructor_id,
            category_id: None,
            status,
            enrolled_count: 0,
            rating_sum: 0,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_course() {
        let pool = setup_pool().await;
        let instructor_id = create_instructor(&pool, "inst1").await;
        let repo = SqlxCourseRepository::new(pool);

        let created = repo
            .create(&test_course("rust-101", instructor_id, CourseStatus::Draft))
            .await
            .expect("Failed to create course");
        assert!(created.id > 0);
        assert_eq!(created.status, CourseStatus::Draft);
        assert_eq!(created.enrolled_count, 0);

        let by_slug = repo
            .get_by_slug("rust-101")
            .await
            .expect("Failed to get course")
            .expect("Course not found");
        assert_eq!(by_slug.id, created.id);
    }

    #[tokio::test]
    async fn test_list_published_excludes_drafts() {
        let pool = setup_pool().await;
        let instructor_id = create_instructor(&pool, "inst2").await;
        let repo = SqlxCourseRepository::new(pool);

        repo.create(&test_course("draft", instructor_id, CourseStatus::Draft))
            .await
            .unwrap();
        repo.create(&test_course("live", instructor_id, CourseStatus::Published))
            .await
            .unwrap();
        repo.create(&test_course("gone", instructor_id, CourseStatus::Archived))
            .await
            .unwrap();

        let page = repo
            .list_published(&ListParams::default(), &CourseFilter::default())
            .await
            .expect("Failed to list");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "live");
    }

    #[tokio::test]
    async fn test_list_published_search_filter() {
        let pool = setup_pool().await;
        let instructor_id = create_instructor(&pool, "inst3").await;
        let repo = SqlxCourseRepository::new(pool);

        let mut a = test_course("rust-course", instructor_id, CourseStatus::Published);
        a.title = "Learn Rust".to_string();
        let mut b = test_course("go-course", instructor_id, CourseStatus::Published);
        b.title = "Learn Go".to_string();
        repo.create(&a).await.unwrap();
        repo.create(&b).await.unwrap();

        let filter = CourseFilter {
            category_id: None,
            search: Some("Rust".to_string()),
        };
        let page = repo
            .list_published(&ListParams::default(), &filter)
            .await
            .expect("Failed to list");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "rust-course");
    }

    #[tokio::test]
    async fn test_list_published_category_filter() {
        let pool = setup_pool().await;
        let instructor_id = create_instructor(&pool, "inst4").await;

        let cat_repo = crate::db::repositories::SqlxCategoryRepository::new(pool.clone());
        let category = crate::db::repositories::CategoryRepository::create(
            &cat_repo,
            &crate::models::CourseCategory {
                id: 0,
                slug: "prog".to_string(),
                name: "Programming".to_string(),
                description: String::new(),
                sort_order: 0,
                created_at: Utc::now(),
            },
        )
        .await
        .unwrap();

        let repo = SqlxCourseRepository::new(pool);
        let mut in_cat = test_course("in-cat", instructor_id, CourseStatus::Published);
        in_cat.category_id = Some(category.id);
        repo.create(&in_cat).await.unwrap();
        repo.create(&test_course("no-cat", instructor_id, CourseStatus::Published))
            .await
            .unwrap();

        let filter = CourseFilter {
            category_id: Some(category.id),
            search: None,
        };
        let page = repo
            .list_published(&ListParams::default(), &filter)
            .await
            .expect("Failed to list");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "in-cat");
    }

    #[tokio::test]
    async fn test_list_by_instructor_includes_drafts() {
        let pool = setup_pool().await;
        let inst_a = create_instructor(&pool, "inst5").await;
        let inst_b = create_instructor(&pool, "inst6").await;
        let repo = SqlxCourseRepository::new(pool);

        repo.create(&test_course("a-draft", inst_a, CourseStatus::Draft))
            .await
            .unwrap();
        repo.create(&test_course("a-live", inst_a, CourseStatus::Published))
            .await
            .unwrap();
        repo.create(&test_course("b-live", inst_b, CourseStatus::Published))
            .await
            .unwrap();

        let page = repo
            .list_by_instructor(inst_a, &ListParams::default())
            .await
            .expect("Failed to list");
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn test_counters() {
        let pool = setup_pool().await;
        let instructor_id = create_instructor(&pool, "inst7").await;
        let repo = SqlxCourseRepository::new(pool);

        let course = repo
            .create(&test_course("counters", instructor_id, CourseStatus::Published))
            .await
            .unwrap();

        repo.increment_enrolled_count(course.id).await.unwrap();
        repo.increment_enrolled_count(course.id).await.unwrap();
        repo.apply_review_delta(course.id, 5, 1).await.unwrap();
        repo.apply_review_delta(course.id, -2, 0).await.unwrap();

        let found = repo.get_by_id(course.id).await.unwrap().unwrap();
        assert_eq!(found.enrolled_count, 2);
        assert_eq!(found.rating_sum, 3);
        assert_eq!(found.rating_count, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = setup_pool().await;
        let instructor_id = create_instructor(&pool, "inst8").await;
        let repo = SqlxCourseRepository::new(pool);

        let mut course = repo
            .create(&test_course("edit-me", instructor_id, CourseStatus::Draft))
            .await
            .unwrap();

        course.title = "Edited".to_string();
        course.status = CourseStatus::Published;
        course.price = 4900;
        let updated = repo.update(&course).await.expect("Failed to update");
        assert_eq!(updated.title, "Edited");
        assert_eq!(updated.status, CourseStatus::Published);
        assert_eq!(updated.price, 4900);

        repo.delete(course.id).await.expect("Failed to delete");
        assert!(repo.get_by_id(course.id).await.unwrap().is_none());
    }
}
