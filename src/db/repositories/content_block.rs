//! Content block repository
//!
//! Database operations for keyed CMS content blocks. Values are arbitrary
//! JSON stored as text.

use crate::models::ContentBlock;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Content block repository trait
#[async_trait]
pub trait ContentBlockRepository: Send + Sync {
    /// Get a block by key
    async fn get(&self, key: &str) -> Result<Option<ContentBlock>>;

    /// Insert or replace the block for a key
    async fn upsert(&self, key: &str, value: &serde_json::Value) -> Result<ContentBlock>;

    /// Delete a block
    async fn delete(&self, key: &str) -> Result<bool>;

    /// List all blocks ordered by key
    async fn list(&self) -> Result<Vec<ContentBlock>>;
}

/// SQLx-based content block repository implementation
pub struct SqlxContentBlockRepository {
    pool: SqlitePool,
}

impl SqlxContentBlockRepository {
    /// Create a new SQLx content block repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn ContentBlockRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ContentBlockRepository for SqlxContentBlockRepository {
    async fn get(&self, key: &str) -> Result<Option<ContentBlock>> {
        let row = sqlx::query("SELECT key, value, updated_at FROM content_blocks WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get content block")?;

        match row {
            Some(row) => Ok(Some(row_to_block(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, key: &str, value: &serde_json::Value) -> Result<ContentBlock> {
        let now = Utc::now();
        let json = serde_json::to_string(value).context("Failed to serialize content block")?;

        sqlx::query(
            r#"
            INSERT INTO content_blocks (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&json)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to upsert content block")?;

        Ok(ContentBlock {
            key: key.to_string(),
            value: value.clone(),
            updated_at: now,
        })
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM content_blocks WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .context("Failed to delete content block")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<ContentBlock>> {
        let rows = sqlx::query("SELECT key, value, updated_at FROM content_blocks ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list content blocks")?;

        let mut blocks = Vec::new();
        for row in rows {
            blocks.push(row_to_block(&row)?);
        }
        Ok(blocks)
    }
}

fn row_to_block(row: &sqlx::sqlite::SqliteRow) -> Result<ContentBlock> {
    let json: String = row.get("value");
    let value = serde_json::from_str(&json).context("Failed to parse content block value")?;

    Ok(ContentBlock {
        key: row.get("key"),
        value,
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::course::tests::setup_pool;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_and_get() {
        let pool = setup_pool().await;
        let repo = SqlxContentBlockRepository::new(pool);

        let value = json!({"headline": "Learn anything", "cta": "Browse courses"});
        repo.upsert("home.hero", &value).await.expect("Failed to upsert");

        let block = repo
            .get("home.hero")
            .await
            .expect("Failed to get")
            .expect("Block not found");
        assert_eq!(block.value["headline"], "Learn anything");
    }

    #[tokio::test]
    async fn test_upsert_replaces_value() {
        let pool = setup_pool().await;
        let repo = SqlxContentBlockRepository::new(pool);

        repo.upsert("home.hero", &json!({"headline": "Old"})).await.unwrap();
        repo.upsert("home.hero", &json!({"headline": "New"})).await.unwrap();

        let block = repo.get("home.hero").await.unwrap().unwrap();
        assert_eq!(block.value["headline"], "New");
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = setup_pool().await;
        let repo = SqlxContentBlockRepository::new(pool);

        repo.upsert("footer.links", &json!([])).await.unwrap();
        assert!(repo.delete("footer.links").await.unwrap());
        assert!(!repo.delete("footer.links").await.unwrap());
        assert!(repo.get("footer.links").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_ordered_by_key() {
        let pool = setup_pool().await;
        let repo = SqlxContentBlockRepository::new(pool);

        repo.upsert("b.block", &json!(1)).await.unwrap();
        repo.upsert("a.block", &json!(2)).await.unwrap();

        let blocks = repo.list().await.expect("Failed to list");
        let keys: Vec<&str> = blocks.iter().map(|b| b.key.as_str()).collect();
        assert_eq!(keys, vec!["a.block", "b.block"]);
    }
}
