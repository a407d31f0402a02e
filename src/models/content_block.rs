//! CMS content block model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A keyed block of marketing page content.
///
/// The value is arbitrary JSON shaped by the frontend (hero sections,
/// testimonial lists, footer links). The server stores and serves it
/// without interpreting the structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Unique key, e.g. `home.hero`
    pub key: String,
    /// Arbitrary JSON payload
    pub value: serde_json::Value,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}
