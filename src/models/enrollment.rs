//! Enrollment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Enrollment entity linking a student to a course.
///
/// Completed lessons are stored as a JSON array of lesson IDs on the row;
/// the repository maps it to `Vec<i64>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    /// Unique identifier
    pub id: i64,
    /// Student user ID
    pub student_id: i64,
    /// Course ID
    pub course_id: i64,
    /// Enrollment status
    pub status: EnrollmentStatus,
    /// IDs of lessons the student has completed
    #[serde(default)]
    pub completed_lessons: Vec<i64>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Check if the enrollment grants course access
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    /// Check if the given lesson has been completed
    pub fn has_completed(&self, lesson_id: i64) -> bool {
        self.completed_lessons.contains(&lesson_id)
    }

    /// Progress as a percentage of the given lesson total, clamped to 100
    pub fn progress_percent(&self, total_lessons: i64) -> u32 {
        if total_lessons <= 0 {
            return 0;
        }
        let done = self.completed_lessons.len() as i64;
        ((done * 100 / total_lessons).clamp(0, 100)) as u32
    }
}

/// Enrollment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    /// Pending - awaiting payment
    Pending,
    /// Active - full course access
    Active,
    /// Blocked - access revoked by an admin
    Blocked,
}

impl Default for EnrollmentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl EnrollmentStatus {
    /// Convert status to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Blocked => "blocked",
        }
    }

    /// Parse status from database string representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(EnrollmentStatus::Pending),
            "active" => Some(EnrollmentStatus::Active),
            "blocked" => Some(EnrollmentStatus::Blocked),
            _ => None,
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_enrollment() -> Enrollment {
        let now = Utc::now();
        Enrollment {
            id: 1,
            student_id: 1,
            course_id: 1,
            status: EnrollmentStatus::Active,
            completed_lessons: vec![1, 2, 3],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_has_completed() {
        let enrollment = sample_enrollment();
        assert!(enrollment.has_completed(2));
        assert!(!enrollment.has_completed(4));
    }

    #[test]
    fn test_progress_percent() {
        let enrollment = sample_enrollment();
        assert_eq!(enrollment.progress_percent(10), 30);
        assert_eq!(enrollment.progress_percent(3), 100);
        assert_eq!(enrollment.progress_percent(0), 0);
        // Stale completion entries never push progress over 100
        assert_eq!(enrollment.progress_percent(2), 100);
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            EnrollmentStatus::Pending,
            EnrollmentStatus::Active,
            EnrollmentStatus::Blocked,
        ] {
            assert_eq!(EnrollmentStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(EnrollmentStatus::from_str("bogus"), None);
    }
}
