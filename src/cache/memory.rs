//! In-memory cache implementation using moka
//!
//! Provides a fast, thread-safe in-memory cache with TTL support and
//! glob-style pattern matching for bulk deletion.

use super::CacheLayer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::future::Cache;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Default maximum cache capacity (number of entries)
const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Default TTL for cache entries (1 hour)
const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Cache entry wrapper that stores serialized JSON data.
/// This allows storing any serializable type in the cache.
#[derive(Clone)]
struct CacheEntry {
    /// JSON-serialized value
    data: Arc<String>,
}

impl CacheEntry {
    fn new<T: Serialize>(value: &T) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            data: Arc::new(json),
        })
    }

    fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.data).context("Failed to deserialize cache value")
    }
}

/// In-memory cache using moka's async cache.
///
/// Values are stored as JSON strings to support generic types.
pub struct MemoryCache {
    /// The underlying moka cache instance
    cache: Cache<String, CacheEntry>,
    /// Default TTL for entries when not specified
    default_ttl: Duration,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MemoryCache {
    /// Create a new memory cache with default settings
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    /// Create a new memory cache with custom max capacity
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::with_capacity_and_ttl(max_capacity, DEFAULT_TTL)
    }

    /// Create a new memory cache with custom capacity and default TTL
    pub fn with_capacity_and_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(default_ttl)
            .support_invalidation_closures()
            .build();

        Self { cache, default_ttl }
    }

    /// Get the default TTL for this cache
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get the current number of entries in the cache
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Check if a pattern matches a key using glob-style matching.
    ///
    /// Supports:
    /// - `*` matches any sequence of characters
    /// - `?` matches any single character
    ///
    /// # Examples
    /// - `courses:*` matches `courses:list:1`, `courses:rust-basics`
    /// - `content:?` matches `content:a` but not `content:ab`
    fn pattern_matches(pattern: &str, key: &str) -> bool {
        let pattern_chars: Vec<char> = pattern.chars().collect();
        let key_chars: Vec<char> = key.chars().collect();
        Self::glob_match(&pattern_chars, &key_chars, 0, 0)
    }

    /// Recursive glob pattern matching
    fn glob_match(pattern: &[char], key: &[char], pi: usize, ki: usize) -> bool {
        if pi == pattern.len() {
            return ki == key.len();
        }

        let p = pattern[pi];

        match p {
            '*' => {
                // Try matching zero characters first, then one or more
                if Self::glob_match(pattern, key, pi + 1, ki) {
                    return true;
                }
                if ki < key.len() && Self::glob_match(pattern, key, pi, ki + 1) {
                    return true;
                }
                false
            }
            '?' => {
                if ki < key.len() {
                    Self::glob_match(pattern, key, pi + 1, ki + 1)
                } else {
                    false
                }
            }
            _ => {
                if ki < key.len() && key[ki] == p {
                    Self::glob_match(pattern, key, pi + 1, ki + 1)
                } else {
                    false
                }
            }
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheLayer for MemoryCache {
    /// Get a value from cache.
    ///
    /// Returns `Ok(Some(value))` if the key exists and hasn't expired,
    /// `Ok(None)` otherwise.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => {
                let value = entry.deserialize()?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache.
    ///
    /// Expiry is governed by the cache-wide `time_to_live`; the per-call
    /// `ttl` argument is advisory and kept for interface symmetry.
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(value)?;
        self.cache.insert(key.to_string(), entry).await;
        let _ = ttl; // TTL is handled by the cache's time_to_live configuration
        Ok(())
    }

    /// Delete a value from cache. No-op when the key doesn't exist.
    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    /// Delete all values matching a glob-style pattern.
    ///
    /// # Examples
    /// - `courses:*` deletes all catalog cache entries
    /// - `content:home.hero` deletes a single CMS block entry
    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        // Iterates all keys; fine at this cache's scale
        let keys_to_delete: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| Self::pattern_matches(pattern, key.as_ref()))
            .map(|(key, _)| (*key).clone())
            .collect();

        for key in keys_to_delete {
            self.cache.invalidate(&key).await;
        }

        Ok(())
    }

    /// Clear all cache entries
    async fn clear(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new();

        cache.set("key1", &"value1".to_string(), Duration::from_secs(60)).await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new();

        let result: Option<String> = cache.get("nonexistent").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new();

        cache.set("key1", &"value1".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.delete("key1").await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_delete_pattern_star() {
        let cache = MemoryCache::new();

        cache.set("courses:1", &"course1".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.set("courses:2", &"course2".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.set("content:home", &"home".to_string(), Duration::from_secs(60)).await.unwrap();

        cache.delete_pattern("courses:*").await.unwrap();

        let course1: Option<String> = cache.get("courses:1").await.unwrap();
        let course2: Option<String> = cache.get("courses:2").await.unwrap();
        let home: Option<String> = cache.get("content:home").await.unwrap();

        assert_eq!(course1, None);
        assert_eq!(course2, None);
        assert_eq!(home, Some("home".to_string()));
    }

    #[tokio::test]
    async fn test_delete_pattern_question_mark() {
        let cache = MemoryCache::new();

        cache.set("user:1:courses", &"a".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.set("user:2:courses", &"b".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.set("user:10:courses", &"c".to_string(), Duration::from_secs(60)).await.unwrap();

        cache.delete_pattern("user:?:courses").await.unwrap();

        let one: Option<String> = cache.get("user:1:courses").await.unwrap();
        let two: Option<String> = cache.get("user:2:courses").await.unwrap();
        let ten: Option<String> = cache.get("user:10:courses").await.unwrap();

        assert_eq!(one, None);
        assert_eq!(two, None);
        // "10" has two characters, so it shouldn't match "?"
        assert_eq!(ten, Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = MemoryCache::new();

        cache.set("key1", &"value1".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.set("key2", &"value2".to_string(), Duration::from_secs(60)).await.unwrap();

        cache.clear().await.unwrap();

        let result1: Option<String> = cache.get("key1").await.unwrap();
        let result2: Option<String> = cache.get("key2").await.unwrap();

        assert_eq!(result1, None);
        assert_eq!(result2, None);
    }

    #[tokio::test]
    async fn test_complex_types() {
        let cache = MemoryCache::new();

        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        struct Course {
            id: i64,
            title: String,
            price: i64,
        }

        let course = Course {
            id: 1,
            title: "Test Course".to_string(),
            price: 4900,
        };

        cache.set("course:1", &course, Duration::from_secs(60)).await.unwrap();

        let result: Option<Course> = cache.get("course:1").await.unwrap();
        assert_eq!(result, Some(course));
    }

    #[test]
    fn test_pattern_matches() {
        // Star wildcard
        assert!(MemoryCache::pattern_matches("courses:*", "courses:123"));
        assert!(MemoryCache::pattern_matches("courses:*", "courses:"));
        assert!(MemoryCache::pattern_matches("*:123", "courses:123"));
        assert!(MemoryCache::pattern_matches("*", "anything"));
        assert!(!MemoryCache::pattern_matches("courses:*", "content:123"));

        // Question mark wildcard
        assert!(MemoryCache::pattern_matches("user:?:courses", "user:1:courses"));
        assert!(MemoryCache::pattern_matches("user:?:courses", "user:a:courses"));
        assert!(!MemoryCache::pattern_matches("user:?:courses", "user:10:courses"));

        // Combined wildcards
        assert!(MemoryCache::pattern_matches("user:*:?", "user:123:a"));
        assert!(MemoryCache::pattern_matches("*:*:*", "a:b:c"));

        // Exact match
        assert!(MemoryCache::pattern_matches("exact", "exact"));
        assert!(!MemoryCache::pattern_matches("exact", "exactx"));
        assert!(!MemoryCache::pattern_matches("exactx", "exact"));
    }

    #[tokio::test]
    async fn test_overwrite_existing_key() {
        let cache = MemoryCache::new();

        cache.set("key1", &"value1".to_string(), Duration::from_secs(60)).await.unwrap();
        cache.set("key1", &"value2".to_string(), Duration::from_secs(60)).await.unwrap();

        let result: Option<String> = cache.get("key1").await.unwrap();
        assert_eq!(result, Some("value2".to_string()));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(20))]

            /// For any cache entry, it should automatically expire after the
            /// configured TTL. A very short TTL keeps the test fast.
            #[test]
            fn property_cache_ttl_expiration(
                key in "[a-z]{1,10}",
                value in "[a-z]{1,100}"
            ) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let ttl = Duration::from_millis(10);
                    let cache = MemoryCache::with_capacity_and_ttl(1000, ttl);

                    cache.set(&key, &value, ttl).await.unwrap();

                    let result: Option<String> = cache.get(&key).await.unwrap();
                    prop_assert_eq!(result, Some(value.clone()));

                    tokio::time::sleep(Duration::from_millis(50)).await;
                    cache.cache.run_pending_tasks().await;

                    let result_after_ttl: Option<String> = cache.get(&key).await.unwrap();
                    prop_assert_eq!(result_after_ttl, None,
                        "Cache entry should expire after TTL. Key: {}", key);

                    Ok(())
                })?;
            }

            /// Pattern deletion removes exactly the keys the glob matches.
            #[test]
            fn property_delete_pattern_scoped(
                suffixes in proptest::collection::vec("[a-z]{1,8}", 1..5),
                other in "[a-z]{1,8}"
            ) {
                let rt = tokio::runtime::Runtime::new().unwrap();
                rt.block_on(async {
                    let cache = MemoryCache::new();
                    let ttl = Duration::from_secs(60);

                    for suffix in &suffixes {
                        cache.set(&format!("courses:{}", suffix), &"x".to_string(), ttl).await.unwrap();
                    }
                    cache.set(&format!("content:{}", other), &"y".to_string(), ttl).await.unwrap();

                    cache.delete_pattern("courses:*").await.unwrap();

                    for suffix in &suffixes {
                        let gone: Option<String> =
                            cache.get(&format!("courses:{}", suffix)).await.unwrap();
                        prop_assert_eq!(gone, None);
                    }
                    let kept: Option<String> =
                        cache.get(&format!("content:{}", other)).await.unwrap();
                    prop_assert_eq!(kept, Some("y".to_string()));

                    Ok(())
                })?;
            }
        }
    }
}
