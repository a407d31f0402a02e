//! Quiz repository
//!
//! Database operations for quiz questions and attempts. Question options and
//! attempt answers are stored as JSON arrays. Attempts upsert on the
//! (student_id, lesson_id) pair so retakes replace the stored row.

use crate::models::{QuizAttempt, QuizQuestion};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Quiz repository trait
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Create a new question
    async fn create_question(&self, question: &QuizQuestion) -> Result<QuizQuestion>;

    /// Get question by ID
    async fn get_question_by_id(&self, id: i64) -> Result<Option<QuizQuestion>>;

    /// List questions of a lesson in sort order
    async fn list_questions_by_lesson(&self, lesson_id: i64) -> Result<Vec<QuizQuestion>>;

    /// Update a question
    async fn update_question(&self, question: &QuizQuestion) -> Result<QuizQuestion>;

    /// Delete a question
    async fn delete_question(&self, id: i64) -> Result<()>;

    /// Get a student's attempt for a lesson
    async fn get_attempt(&self, student_id: i64, lesson_id: i64) -> Result<Option<QuizAttempt>>;

    /// Insert the attempt, or replace answers and score on retake and bump
    /// the attempt counter
    async fn upsert_attempt(
        &self,
        student_id: i64,
        lesson_id: i64,
        answers: &[i32],
        score: i32,
        total: i32,
    ) -> Result<QuizAttempt>;
}

/// SQLx-based quiz repository implementation
pub struct SqlxQuizRepository {
    pool: SqlitePool,
}

impl SqlxQuizRepository {
    /// Create a new SQLx quiz repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn QuizRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl QuizRepository for SqlxQuizRepository {
    async fn create_question(&self, question: &QuizQuestion) -> Result<QuizQuestion> {
        let now = Utc::now();
        let options =
            serde_json::to_string(&question.options).context("Failed to serialize options")?;

        let result = sqlx::query(
            r#"
            INSERT INTO quiz_questions (lesson_id, prompt, options, correct_index, sort_order, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(question.lesson_id)
        .bind(&question.prompt)
        .bind(&options)
        .bind(question.correct_index)
        .bind(question.sort_order)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create quiz question")?;

        Ok(QuizQuestion {
            id: result.last_insert_rowid(),
            lesson_id: question.lesson_id,
            prompt: question.prompt.clone(),
            options: question.options.clone(),
            correct_index: question.correct_index,
            sort_order: question.sort_order,
            created_at: now,
        })
    }

    async fn get_question_by_id(&self, id: i64) -> Result<Option<QuizQuestion>> {
        let row = sqlx::query(
            r#"
            SELECT id, lesson_id, prompt, options, correct_index, sort_order, created_at
            FROM quiz_questions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get quiz question")?;

        match row {
            Some(row) => Ok(Some(row_to_question(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_questions_by_lesson(&self, lesson_id: i64) -> Result<Vec<QuizQuestion>> {
        let rows = sqlx::query(
            r#"
            SELECT id, lesson_id, prompt, options, correct_index, sort_order, created_at
            FROM quiz_questions
            WHERE lesson_id = ?
            ORDER BY sort_order, id
            "#,
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list quiz questions")?;

        let mut questions = Vec::new();
        for row in rows {
            questions.push(row_to_question(&row)?);
        }
        Ok(questions)
    }

    async fn update_question(&self, question: &QuizQuestion) -> Result<QuizQuestion> {
        let options =
            serde_json::to_string(&question.options).context("Failed to serialize options")?;

        sqlx::query(
            r#"
            UPDATE quiz_questions
            SET prompt = ?, options = ?, correct_index = ?, sort_order = ?
            WHERE id = ?
            "#,
        )
        .bind(&question.prompt)
        .bind(&options)
        .bind(question.correct_index)
        .bind(question.sort_order)
        .bind(question.id)
        .execute(&self.pool)
        .await
        .context("Failed to update quiz question")?;

        self.get_question_by_id(question.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Quiz question not found after update"))
    }

    async fn delete_question(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM quiz_questions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete quiz question")?;
        Ok(())
    }

    async fn get_attempt(&self, student_id: i64, lesson_id: i64) -> Result<Option<QuizAttempt>> {
        let row = sqlx::query(
            r#"
            SELECT id, student_id, lesson_id, answers, score, total, attempts, created_at, updated_at
            FROM quiz_attempts
            WHERE student_id = ? AND lesson_id = ?
            "#,
        )
        .bind(student_id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get quiz attempt")?;

        match row {
            Some(row) => Ok(Some(row_to_attempt(&row)?)),
            None => Ok(None),
        }
    }

    async fn upsert_attempt(
        &self,
        student_id: i64,
        lesson_id: i64,
        answers: &[i32],
        score: i32,
        total: i32,
    ) -> Result<QuizAttempt> {
        let now = Utc::now();
        let answers_json = serde_json::to_string(answers).context("Failed to serialize answers")?;

        sqlx::query(
            r#"
            INSERT INTO quiz_attempts (student_id, lesson_id, answers, score, total, attempts, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 1, ?, ?)
            ON CONFLICT (student_id, lesson_id) DO UPDATE SET
                answers = excluded.answers,
                score = excluded.score,
                total = excluded.total,
                attempts = attempts + 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(student_id)
        .bind(lesson_id)
        .bind(&answers_json)
        .bind(score)
        .bind(total)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to upsert quiz attempt")?;

        self.get_attempt(student_id, lesson_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Quiz attempt not found after upsert"))
    }
}

fn row_to_question(row: &sqlx::sqlite::SqliteRow) -> Result<QuizQuestion> {
    let options_json: String = row.get("options");
    let options: Vec<String> =
        serde_json::from_str(&options_json).context("Failed to parse question options")?;

    Ok(QuizQuestion {
        id: row.get("id"),
        lesson_id: row.get("lesson_id"),
        prompt: row.get("prompt"),
        options,
        correct_index: row.get("correct_index"),
        sort_order: row.get("sort_order"),
        created_at: row.get("created_at"),
    })
}

fn row_to_attempt(row: &sqlx::sqlite::SqliteRow) -> Result<QuizAttempt> {
    let answers_json: String = row.get("answers");
    let answers: Vec<i32> =
        serde_json::from_str(&answers_json).context("Failed to parse attempt answers")?;

    Ok(QuizAttempt {
        id: row.get("id"),
        student_id: row.get("student_id"),
        lesson_id: row.get("lesson_id"),
        answers,
        score: row.get("score"),
        total: row.get("total"),
        attempts: row.get("attempts"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
