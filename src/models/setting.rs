//! Setting model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key/value setting entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    /// Setting key
    pub key: String,
    /// Setting value
    pub value: String,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}
