//! Content service
//!
//! Business logic for the CMS content blocks serving the marketing pages.
//! Reads fetch through the cache under `content:{key}`; upserts and deletes
//! drop the matching entry so the next read sees fresh data.

use crate::cache::{CacheLayer, MemoryCache};
use crate::db::repositories::ContentBlockRepository;
use crate::models::ContentBlock;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

/// Cache TTL for content blocks (1 hour)
const CONTENT_CACHE_TTL_SECS: u64 = 3600;

/// Error types for content service operations
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Block not found
    #[error("Content block not found: {0}")]
    NotFound(String),

    /// Invalid key
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Content block service
pub struct ContentService {
    repo: Arc<dyn ContentBlockRepository>,
    cache: Arc<MemoryCache>,
}

impl ContentService {
    /// Create a new content service
    pub fn new(repo: Arc<dyn ContentBlockRepository>, cache: Arc<MemoryCache>) -> Self {
        Self { repo, cache }
    }

    /// Get a content block by key, through the cache
    pub async fn get(&self, key: &str) -> Result<ContentBlock, ContentError> {
        let cache_key = cache_key(key);
        if let Ok(Some(block)) = self.cache.get::<ContentBlock>(&cache_key).await {
            return Ok(block);
        }

        let block = self
            .repo
            .get(key)
            .await
            .context("Failed to get content block")?
            .ok_or_else(|| ContentError::NotFound(key.to_string()))?;

        let _ = self
            .cache
            .set(&cache_key, &block, Duration::from_secs(CONTENT_CACHE_TTL_SECS))
            .await;
        Ok(block)
    }

    /// Create or replace a content block (admin operation)
    pub async fn upsert(
        &self,
        key: &str,
        value: serde_json::Value,
    ) -> Result<ContentBlock, ContentError> {
        validate_key(key)?;

        let block = self
            .repo
            .upsert(key, &value)
            .await
            .context("Failed to upsert content block")?;

        let _ = self.cache.delete(&cache_key(key)).await;
        tracing::info!(key, "Content block updated");
        Ok(block)
    }

    /// Delete a content block (admin operation)
    pub async fn delete(&self, key: &str) -> Result<(), ContentError> {
        let deleted = self
            .repo
            .delete(key)
            .await
            .context("Failed to delete content block")?;
        if !deleted {
            return Err(ContentError::NotFound(key.to_string()));
        }

        let _ = self.cache.delete(&cache_key(key)).await;
        Ok(())
    }

    /// All content blocks (admin operation)
    pub async fn list(&self) -> Result<Vec<ContentBlock>, ContentError> {
        Ok(self.repo.list().await.context("Failed to list content blocks")?)
    }
}

fn cache_key(key: &str) -> String {
    format!("content:{}", key)
}

/// Keys are dotted lowercase paths like `home.hero`.
fn validate_key(key: &str) -> Result<(), ContentError> {
    if key.is_empty() || key.len() > 100 {
        return Err(ContentError::ValidationError(
            "Key must be 1 to 100 characters".to_string(),
        ));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' || c == '-')
    {
        return Err(ContentError::ValidationError(format!(
            "Invalid content key '{}'",
            key
        )));
    }
    Ok(())
}
