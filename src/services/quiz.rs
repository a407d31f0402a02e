//! Quiz service
//!
//! Business logic for lesson quizzes. Students only ever see questions with
//! the correct answers stripped; grading happens server-side against the
//! stored questions. A resubmission replaces the stored attempt and bumps
//! the attempt counter.

use crate::db::repositories::{
    CourseRepository, EnrollmentRepository, LessonRepository, QuizRepository,
};
use crate::models::{
    CreateQuestionInput, Lesson, QuizAttempt, QuizQuestion, QuizSubmission, UpdateQuestionInput,
    User,
};
use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// Error types for quiz service operations
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    /// Lesson or question not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// No active enrollment for the lesson's course
    #[error("No active enrollment")]
    NotEnrolled,

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Actor is not allowed to manage the lesson's course
    #[error("Not allowed to manage this course")]
    Forbidden,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// A question as shown to students, without the correct answer
#[derive(Debug, Clone, Serialize)]
pub struct StudentQuestion {
    /// Question ID
    pub id: i64,
    /// Question prompt
    pub prompt: String,
    /// Answer options
    pub options: Vec<String>,
}

impl From<QuizQuestion> for StudentQuestion {
    fn from(q: QuizQuestion) -> Self {
        Self {
            id: q.id,
            prompt: q.prompt,
            options: q.options,
        }
    }
}

/// Grading outcome of a quiz submission
#[derive(Debug, Clone, Serialize)]
pub struct QuizResult {
    /// Number of correct answers
    pub score: i32,
    /// Number of questions
    pub total: i32,
    /// Per-question correctness, in question order
    pub correctness: Vec<bool>,
    /// How many times the student has submitted this quiz
    pub attempts: i32,
}

/// Quiz service
pub struct QuizService {
    quiz_repo: Arc<dyn QuizRepository>,
    lesson_repo: Arc<dyn LessonRepository>,
    course_repo: Arc<dyn CourseRepository>,
    enrollment_repo: Arc<dyn EnrollmentRepository>,
}

impl QuizService {
    /// Create a new quiz service
    pub fn new(
        quiz_repo: Arc<dyn QuizRepository>,
        lesson_repo: Arc<dyn LessonRepository>,
        course_repo: Arc<dyn CourseRepository>,
        enrollment_repo: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            quiz_repo,
            lesson_repo,
            course_repo,
            enrollment_repo,
        }
    }

    // ---- Student side ----

    /// Questions of a lesson for an enrolled student, answers stripped
    pub async fn questions_for_student(
        &self,
        student: &User,
        lesson_id: i64,
    ) -> Result<Vec<StudentQuestion>, QuizError> {
        let lesson = self.get_lesson(lesson_id).await?;
        self.require_active_enrollment(student.id, lesson.course_id).await?;

        let questions = self
            .quiz_repo
            .list_questions_by_lesson(lesson_id)
            .await
            .context("Failed to list questions")?;

        Ok(questions.into_iter().map(StudentQuestion::from).collect())
    }

    /// Grade a submission and store it as the student's latest attempt.
    ///
    /// The answer list must cover every question of the lesson in order.
    pub async fn submit(
        &self,
        student: &User,
        lesson_id: i64,
        submission: QuizSubmission,
    ) -> Result<QuizResult, QuizError> {
        let lesson = self.get_lesson(lesson_id).await?;
        self.require_active_enrollment(student.id, lesson.course_id).await?;

        let questions = self
            .quiz_repo
            .list_questions_by_lesson(lesson_id)
            .await
            .context("Failed to list questions")?;

        if questions.is_empty() {
            return Err(QuizError::ValidationError(
                "Lesson has no quiz".to_string(),
            ));
        }
        if submission.answers.len() != questions.len() {
            return Err(QuizError::ValidationError(format!(
                "Expected {} answers, got {}",
                questions.len(),
                submission.answers.len()
            )));
        }

        let correctness: Vec<bool> = questions
            .iter()
            .zip(submission.answers.iter())
            .map(|(question, answer)| *answer == question.correct_index)
            .collect();
        let score = correctness.iter().filter(|c| **c).count() as i32;
        let total = questions.len() as i32;

        let attempt = self
            .quiz_repo
            .upsert_attempt(student.id, lesson_id, &submission.answers, score, total)
            .await
            .context("Failed to store attempt")?;

        tracing::debug!(
            student_id = student.id,
            lesson_id,
            score,
            total,
            attempts = attempt.attempts,
            "Quiz graded"
        );
        Ok(QuizResult {
            score,
            total,
            correctness,
            attempts: attempt.attempts,
        })
    }

    /// The student's latest stored attempt for a lesson
    pub async fn result(
        &self,
        student: &User,
        lesson_id: i64,
    ) -> Result<Option<QuizAttempt>, QuizError> {
        let lesson = self.get_lesson(lesson_id).await?;
        self.require_active_enrollment(student.id, lesson.course_id).await?;

        Ok(self
            .quiz_repo
            .get_attempt(student.id, lesson_id)
            .await
            .context("Failed to get attempt")?)
    }

    // ---- Instructor side ----

    /// Questions of a lesson including correct answers, for management
    pub async fn list_questions(
        &self,
        actor: &User,
        lesson_id: i64,
    ) -> Result<Vec<QuizQuestion>, QuizError> {
        let lesson = self.get_lesson(lesson_id).await?;
        self.require_ownership(actor, &lesson).await?;

        Ok(self
            .quiz_repo
            .list_questions_by_lesson(lesson_id)
            .await
            .context("Failed to list questions")?)
    }

    /// Add a question to a lesson in a course the actor manages
    pub async fn create_question(
        &self,
        actor: &User,
        lesson_id: i64,
        input: CreateQuestionInput,
    ) -> Result<QuizQuestion, QuizError> {
        let lesson = self.get_lesson(lesson_id).await?;
        self.require_ownership(actor, &lesson).await?;

        if !input.is_valid() {
            return Err(QuizError::ValidationError(
                "A question needs at least two options and an in-range correct index".to_string(),
            ));
        }

        Ok(self
            .quiz_repo
            .create_question(&QuizQuestion {
                id: 0,
                lesson_id,
                prompt: input.prompt,
                options: input.options,
                correct_index: input.correct_index,
                sort_order: input.sort_order.unwrap_or(0),
                created_at: Utc::now(),
            })
            .await
            .context("Failed to create question")?)
    }

    /// Update a question in a course the actor manages
    pub async fn update_question(
        &self,
        actor: &User,
        question_id: i64,
        input: UpdateQuestionInput,
    ) -> Result<QuizQuestion, QuizError> {
        if !input.has_changes() {
            return Err(QuizError::ValidationError("No fields to update".to_string()));
        }

        let mut question = self
            .quiz_repo
            .get_question_by_id(question_id)
            .await
            .context("Failed to get question")?
            .ok_or_else(|| QuizError::NotFound(format!("Question {}", question_id)))?;
        let lesson = self.get_lesson(question.lesson_id).await?;
        self.require_ownership(actor, &lesson).await?;

        if let Some(prompt) = input.prompt {
            question.prompt = prompt;
        }
        if let Some(options) = input.options {
            question.options = options;
        }
        if let Some(correct_index) = input.correct_index {
            question.correct_index = correct_index;
        }
        if let Some(sort_order) = input.sort_order {
            question.sort_order = sort_order;
        }

        if question.options.len() < 2
            || question.correct_index < 0
            || question.correct_index as usize >= question.options.len()
        {
            return Err(QuizError::ValidationError(
                "A question needs at least two options and an in-range correct index".to_string(),
            ));
        }

        Ok(self
            .quiz_repo
            .update_question(&question)
            .await
            .context("Failed to update question")?)
    }

    /// Delete a question from a course the actor manages
    pub async fn delete_question(&self, actor: &User, question_id: i64) -> Result<(), QuizError> {
        let question = self
            .quiz_repo
            .get_question_by_id(question_id)
            .await
            .context("Failed to get question")?
            .ok_or_else(|| QuizError::NotFound(format!("Question {}", question_id)))?;
        let lesson = self.get_lesson(question.lesson_id).await?;
        self.require_ownership(actor, &lesson).await?;

        self.quiz_repo
            .delete_question(question_id)
            .await
            .context("Failed to delete question")?;
        Ok(())
    }

    // ---- Internals ----

    async fn get_lesson(&self, lesson_id: i64) -> Result<Lesson, QuizError> {
        self.lesson_repo
            .get_by_id(lesson_id)
            .await
            .context("Failed to get lesson")?
            .ok_or_else(|| QuizError::NotFound(format!("Lesson {}", lesson_id)))
    }

    async fn require_ownership(&self, actor: &User, lesson: &Lesson) -> Result<(), QuizError> {
        let course = self
            .course_repo
            .get_by_id(lesson.course_id)
            .await
            .context("Failed to get course")?
            .ok_or_else(|| QuizError::NotFound(format!("Course {}", lesson.course_id)))?;
        if !actor.can_manage_course(course.instructor_id) {
            return Err(QuizError::Forbidden);
        }
        Ok(())
    }

    async fn require_active_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<(), QuizError> {
        self.enrollment_repo
            .get_by_student_and_course(student_id, course_id)
            .await
            .context("Failed to get enrollment")?
            .filter(|e| e.is_active())
            .ok_or(QuizError::NotEnrolled)?;
        Ok(())
    }
}
