//! Settings repository
//!
//! Database operations for key/value settings.

use crate::models::Setting;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Settings repository trait
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Get a setting by key
    async fn get(&self, key: &str) -> Result<Option<Setting>>;

    /// Insert or replace the value for a key
    async fn set(&self, key: &str, value: &str) -> Result<Setting>;

    /// Get all settings ordered by key
    async fn get_all(&self) -> Result<Vec<Setting>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// SQLx-based settings repository implementation
pub struct SqlxSettingsRepository {
    pool: SqlitePool,
}

impl SqlxSettingsRepository {
    /// Create a new SQLx settings repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn SettingsRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SettingsRepository for SqlxSettingsRepository {
    async fn get(&self, key: &str) -> Result<Option<Setting>> {
        let row = sqlx::query("SELECT key, value, updated_at FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get setting")?;

        Ok(row.as_ref().map(row_to_setting))
    }

    async fn set(&self, key: &str, value: &str) -> Result<Setting> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to set setting")?;

        Ok(Setting {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: now,
        })
    }

    async fn get_all(&self) -> Result<Vec<Setting>> {
        let rows = sqlx::query("SELECT key, value, updated_at FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list settings")?;

        Ok(rows.iter().map(row_to_setting).collect())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .context("Failed to delete setting")?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_setting(row: &sqlx::sqlite::SqliteRow) -> Setting {
    Setting {
        key: row.get("key"),
        value: row.get("value"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::course::tests::setup_pool;

    #[tokio::test]
    async fn test_set_and_get() {
        let pool = setup_pool().await;
        let repo = SqlxSettingsRepository::new(pool);

        repo.set("site_name", "CourseHub").await.expect("Failed to set");

        let setting = repo
            .get("site_name")
            .await
            .expect("Failed to get")
            .expect("Setting not found");
        assert_eq!(setting.value, "CourseHub");
    }

    #[tokio::test]
    async fn test_set_replaces_value() {
        let pool = setup_pool().await;
        let repo = SqlxSettingsRepository::new(pool);

        repo.set("support_email", "old@example.com").await.unwrap();
        repo.set("support_email", "new@example.com").await.unwrap();

        let setting = repo.get("support_email").await.unwrap().unwrap();
        assert_eq!(setting.value, "new@example.com");
        assert_eq!(repo.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_all_ordered() {
        let pool = setup_pool().await;
        let repo = SqlxSettingsRepository::new(pool);

        repo.set("b_key", "2").await.unwrap();
        repo.set("a_key", "1").await.unwrap();

        let settings = repo.get_all().await.expect("Failed to get all");
        let keys: Vec<&str> = settings.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["a_key", "b_key"]);
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = setup_pool().await;
        let repo = SqlxSettingsRepository::new(pool);

        repo.set("temp", "x").await.unwrap();
        assert!(repo.delete("temp").await.unwrap());
        assert!(!repo.delete("temp").await.unwrap());
        assert!(repo.get("temp").await.unwrap().is_none());
    }
}
