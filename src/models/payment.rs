//! Payment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payment entity for a paid course enrollment.
///
/// The gateway reference is issued locally at checkout time and is the key
/// the gateway's redirect callbacks use to find the payment again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: i64,
    /// Paying student user ID
    pub student_id: i64,
    /// Course ID
    pub course_id: i64,
    /// Amount in minor currency units
    pub amount: i64,
    /// ISO currency code
    pub currency: String,
    /// Gateway checkout reference (unique)
    pub gateway_reference: String,
    /// Payment status
    pub status: PaymentStatus,
    /// Failure reason reported by the gateway, if any
    #[serde(default)]
    pub failure_reason: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Check if the payment has reached a terminal state
    pub fn is_finalized(&self) -> bool {
        self.status.is_finalized()
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Initiated - checkout created, awaiting the gateway outcome
    Initiated,
    /// Completed - paid; the enrollment has been activated
    Completed,
    /// Cancelled - the student abandoned checkout
    Cancelled,
    /// Failed - the gateway rejected the payment
    Failed,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Initiated
    }
}

impl PaymentStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Initiated => "initiated",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::Failed => "failed",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "initiated" => Some(PaymentStatus::Initiated),
            "completed" => Some(PaymentStatus::Completed),
            "cancelled" => Some(PaymentStatus::Cancelled),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }

    /// Terminal states reject any further transition
    pub fn is_finalized(&self) -> bool {
        !matches!(self, PaymentStatus::Initiated)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
