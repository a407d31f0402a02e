//! Course category repository
//!
//! Database operations for course categories.
//!
//! This module provides:
//! - `CategoryRepository` trait defining the interface for category data access
//! - `SqlxCategoryRepository` implementing the trait over SQLite

use crate::models::CourseCategory;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &CourseCategory) -> Result<CourseCategory>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<CourseCategory>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<CourseCategory>>;

    /// List all categories ordered by sort order
    async fn list(&self) -> Result<Vec<CourseCategory>>;

    /// Update a category
    async fn update(&self, category: &CourseCategory) -> Result<CourseCategory>;

    /// Delete a category
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a category slug already exists
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &CourseCategory) -> Result<CourseCategory> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO course_categories (slug, name, description, sort_order, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&category.slug)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create category")?;

        Ok(CourseCategory {
            id: result.last_insert_rowid(),
            slug: category.slug.clone(),
            name: category.name.clone(),
            description: category.description.clone(),
            sort_order: category.sort_order,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<CourseCategory>> {
        get_category_by_id(&self.pool, id).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<CourseCategory>> {
        let row = sqlx::query(
            r#"
            SELECT id, slug, name, description, sort_order, created_at
            FROM course_categories
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get category by slug")?;

        match row {
            Some(row) => Ok(Some(row_to_category(&row))),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<CourseCategory>> {
        let rows = sqlx::query(
            r#"
            SELECT id, slug, name, description, sort_order, created_at
            FROM course_categories
            ORDER BY sort_order, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn update(&self, category: &CourseCategory) -> Result<CourseCategory> {
        sqlx::query(
            r#"
            UPDATE course_categories
            SET slug = ?, name = ?, description = ?, sort_order = ?
            WHERE id = ?
            "#,
        )
        .bind(&category.slug)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.sort_order)
        .bind(category.id)
        .execute(&self.pool)
        .await
        .context("Failed to update category")?;

        get_category_by_id(&self.pool, category.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Category not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM course_categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;
        Ok(())
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM course_categories WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check category slug existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }
}

async fn get_category_by_id(pool: &SqlitePool, id: i64) -> Result<Option<CourseCategory>> {
    let row = sqlx::query(
        r#"
        SELECT id, slug, name, description, sort_order, created_at
        FROM course_categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_category(&row))),
        None => Ok(None),
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> CourseCategory {
    CourseCategory {
        id: row.get("id"),
        slug: row.get("slug"),
        name: row.get("name"),
        description: row.get("description"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    }
}
