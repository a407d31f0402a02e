//! Quiz models
//!
//! Quiz questions hang off a lesson. Grading is server-side; a student's
//! latest submission replaces the stored attempt and bumps the attempt
//! counter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A multiple-choice question attached to a lesson
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Unique identifier
    pub id: i64,
    /// Owning lesson ID
    pub lesson_id: i64,
    /// Question prompt
    pub prompt: String,
    /// Answer options
    pub options: Vec<String>,
    /// Index into `options` of the correct answer
    pub correct_index: i32,
    /// Sort order within the lesson (lower = earlier)
    #[serde(default)]
    pub sort_order: i32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A student's graded quiz attempt for a lesson.
///
/// One row per student/lesson pair. Retakes overwrite the answers and score
/// and increment `attempts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    /// Unique identifier
    pub id: i64,
    /// Student user ID
    pub student_id: i64,
    /// Lesson ID
    pub lesson_id: i64,
    /// Selected option index per question, in question order
    pub answers: Vec<i32>,
    /// Number of correct answers
    pub score: i32,
    /// Number of questions at grading time
    pub total: i32,
    /// How many times the student has submitted this quiz
    pub attempts: i32,
    /// First submission timestamp
    pub created_at: DateTime<Utc>,
    /// Latest submission timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a quiz question
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestionInput {
    /// Question prompt
    pub prompt: String,
    /// Answer options (at least two)
    pub options: Vec<String>,
    /// Index of the correct option
    pub correct_index: i32,
    /// Sort order (optional)
    #[serde(default)]
    pub sort_order: Option<i32>,
}

impl CreateQuestionInput {
    /// Check structural validity: at least two options and an in-range
    /// correct index.
    pub fn is_valid(&self) -> bool {
        self.options.len() >= 2
            && self.correct_index >= 0
            && (self.correct_index as usize) < self.options.len()
    }
}

/// Input for updating a quiz question
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuestionInput {
    /// New prompt (optional)
    pub prompt: Option<String>,
    /// New options (optional)
    pub options: Option<Vec<String>>,
    /// New correct index (optional)
    pub correct_index: Option<i32>,
    /// New sort order (optional)
    pub sort_order: Option<i32>,
}

impl UpdateQuestionInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.prompt.is_some()
            || self.options.is_some()
            || self.correct_index.is_some()
            || self.sort_order.is_some()
    }
}

/// A quiz submission from a student
#[derive(Debug, Clone, Deserialize)]
pub struct QuizSubmission {
    /// Selected option index per question, in question order
    pub answers: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_question_validity() {
        let valid = CreateQuestionInput {
            prompt: "2 + 2 = ?".to_string(),
            options: vec!["3".to_string(), "4".to_string()],
            correct_index: 1,
            sort_order: None,
        };
        assert!(valid.is_valid());

        let one_option = CreateQuestionInput {
            options: vec!["4".to_string()],
            ..valid.clone()
        };
        assert!(!one_option.is_valid());

        let out_of_range = CreateQuestionInput {
            correct_index: 2,
            ..valid.clone()
        };
        assert!(!out_of_range.is_valid());

        let negative = CreateQuestionInput {
            correct_index: -1,
            ..valid
        };
        assert!(!negative.is_valid());
    }
}
