//! Course category model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course category entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseCategory {
    /// Unique identifier
    pub id: i64,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Sort order (lower = earlier)
    #[serde(default)]
    pub sort_order: i32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    /// URL-friendly slug
    pub slug: String,
    /// Display name
    pub name: String,
    /// Description (optional)
    #[serde(default)]
    pub description: Option<String>,
    /// Sort order (optional)
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Input for updating a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    /// New slug (optional)
    pub slug: Option<String>,
    /// New name (optional)
    pub name: Option<String>,
    /// New description (optional)
    pub description: Option<String>,
    /// New sort order (optional)
    pub sort_order: Option<i32>,
}

impl UpdateCategoryInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.slug.is_some()
            || self.name.is_some()
            || self.description.is_some()
            || self.sort_order.is_some()
    }
}
