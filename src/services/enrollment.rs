//! Enrollment service
//!
//! Business logic for enrolling in courses and tracking learning progress.
//! Free courses activate immediately; paid courses create a pending
//! enrollment plus an initiated payment carrying a locally issued checkout
//! reference. The gateway is never called server-to-server.

use crate::cache::{CacheLayer, MemoryCache};
use crate::config::PaymentConfig;
use crate::db::repositories::{
    CourseRepository, EnrollmentRepository, LessonRepository, PaymentRepository,
};
use crate::models::{
    Course, CourseStatus, Enrollment, EnrollmentStatus, Payment, PaymentStatus, User,
};
use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Error types for enrollment service operations
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    /// Course or lesson not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Course is not open for enrollment
    #[error("Course is not published")]
    NotPublished,

    /// Student is already enrolled
    #[error("Already enrolled in this course")]
    AlreadyEnrolled,

    /// No active enrollment for the course
    #[error("No active enrollment")]
    NotEnrolled,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Checkout details returned when enrolling in a paid course
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutInfo {
    /// Gateway reference of the initiated payment
    pub reference: String,
    /// URL the client should redirect to
    pub redirect_url: String,
    /// Amount due in minor units
    pub amount: i64,
    /// Currency code
    pub currency: String,
}

/// Result of an enrollment request
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentOutcome {
    /// The created enrollment
    pub enrollment: Enrollment,
    /// Checkout details, present only for paid courses
    pub checkout: Option<CheckoutInfo>,
}

/// An enrollment joined with its course and progress numbers
#[derive(Debug, Clone, Serialize)]
pub struct EnrollmentProgress {
    /// The enrollment
    pub enrollment: Enrollment,
    /// The course
    pub course: Course,
    /// Lessons completed
    pub completed_lessons: usize,
    /// Total lessons in the course
    pub total_lessons: i64,
    /// Completion percentage, 0..=100
    pub progress_percent: u32,
}

/// Enrollment service
pub struct EnrollmentService {
    enrollment_repo: Arc<dyn EnrollmentRepository>,
    course_repo: Arc<dyn CourseRepository>,
    lesson_repo: Arc<dyn LessonRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
    cache: Arc<MemoryCache>,
    payment_config: PaymentConfig,
}

impl EnrollmentService {
    /// Create a new enrollment service
    pub fn new(
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        course_repo: Arc<dyn CourseRepository>,
        lesson_repo: Arc<dyn LessonRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        cache: Arc<MemoryCache>,
        payment_config: PaymentConfig,
    ) -> Self {
        Self {
            enrollment_repo,
            course_repo,
            lesson_repo,
            payment_repo,
            cache,
            payment_config,
        }
    }

    /// Enroll the student in a published course.
    ///
    /// Free courses produce an active enrollment right away and bump the
    /// course's enrolled count. Paid courses produce a pending enrollment
    /// plus an initiated payment whose checkout reference the client takes
    /// to the gateway.
    pub async fn enroll(
        &self,
        student: &User,
        course_id: i64,
    ) -> Result<EnrollmentOutcome, EnrollmentError> {
        let course = self
            .course_repo
            .get_by_id(course_id)
            .await
            .context("Failed to get course")?
            .ok_or_else(|| EnrollmentError::NotFound(format!("Course {}", course_id)))?;

        if course.status != CourseStatus::Published {
            return Err(EnrollmentError::NotPublished);
        }

        if self
            .enrollment_repo
            .get_by_student_and_course(student.id, course_id)
            .await
            .context("Failed to check enrollment")?
            .is_some()
        {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        let now = Utc::now();
        let status = if course.is_free() {
            EnrollmentStatus::Active
        } else {
            EnrollmentStatus::Pending
        };

        let enrollment = self
            .enrollment_repo
            .create(&Enrollment {
                id: 0,
                student_id: student.id,
                course_id,
                status,
                completed_lessons: Vec::new(),
                created_at: now,
                updated_at: now,
            })
            .await
            .context("Failed to create enrollment")?;

        let checkout = if course.is_free() {
            self.course_repo
                .increment_enrolled_count(course_id)
                .await
                .context("Failed to increment enrolled count")?;
            let _ = self.cache.delete_pattern("courses:*").await;
            tracing::info!(student_id = student.id, course_id, "Free enrollment activated");
            None
        } else {
            let reference = Uuid::new_v4().to_string();
            self.payment_repo
                .create(&Payment {
                    id: 0,
                    student_id: student.id,
                    course_id,
                    amount: course.price,
                    currency: course.currency.clone(),
                    gateway_reference: reference.clone(),
                    status: PaymentStatus::Initiated,
                    failure_reason: None,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .context("Failed to create payment")?;

            tracing::info!(
                student_id = student.id,
                course_id,
                reference = %reference,
                mode = ?self.payment_config.mode,
                "Payment initiated"
            );
            Some(CheckoutInfo {
                redirect_url: format!(
                    "{}/checkout/{}",
                    self.payment_config.redirect_base.trim_end_matches('/'),
                    reference
                ),
                reference,
                amount: course.price,
                currency: course.currency.clone(),
            })
        };

        Ok(EnrollmentOutcome { enrollment, checkout })
    }

    /// The student's enrollments with course and progress data, newest first
    pub async fn list_with_progress(
        &self,
        student: &User,
    ) -> Result<Vec<EnrollmentProgress>, EnrollmentError> {
        let enrollments = self
            .enrollment_repo
            .list_by_student(student.id)
            .await
            .context("Failed to list enrollments")?;

        let mut result = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            let course = match self
                .course_repo
                .get_by_id(enrollment.course_id)
                .await
                .context("Failed to get course")?
            {
                Some(c) => c,
                None => continue,
            };
            let total_lessons = self
                .lesson_repo
                .count_by_course(course.id)
                .await
                .context("Failed to count lessons")?;

            result.push(EnrollmentProgress {
                completed_lessons: enrollment.completed_lessons.len(),
                progress_percent: enrollment.progress_percent(total_lessons),
                enrollment,
                course,
                total_lessons,
            });
        }
        Ok(result)
    }

    /// Progress in a single course
    pub async fn progress(
        &self,
        student: &User,
        course_id: i64,
    ) -> Result<EnrollmentProgress, EnrollmentError> {
        let enrollment = self
            .enrollment_repo
            .get_by_student_and_course(student.id, course_id)
            .await
            .context("Failed to get enrollment")?
            .ok_or(EnrollmentError::NotEnrolled)?;
        let course = self
            .course_repo
            .get_by_id(course_id)
            .await
            .context("Failed to get course")?
            .ok_or_else(|| EnrollmentError::NotFound(format!("Course {}", course_id)))?;
        let total_lessons = self
            .lesson_repo
            .count_by_course(course_id)
            .await
            .context("Failed to count lessons")?;

        Ok(EnrollmentProgress {
            completed_lessons: enrollment.completed_lessons.len(),
            progress_percent: enrollment.progress_percent(total_lessons),
            enrollment,
            course,
            total_lessons,
        })
    }

    /// Mark a lesson complete for the student.
    ///
    /// Requires an active enrollment in the lesson's course. Completing the
    /// same lesson twice is a no-op.
    pub async fn complete_lesson(
        &self,
        student: &User,
        lesson_id: i64,
    ) -> Result<EnrollmentProgress, EnrollmentError> {
        let lesson = self
            .lesson_repo
            .get_by_id(lesson_id)
            .await
            .context("Failed to get lesson")?
            .ok_or_else(|| EnrollmentError::NotFound(format!("Lesson {}", lesson_id)))?;

        let enrollment = self.require_active_enrollment(student.id, lesson.course_id).await?;

        if !enrollment.completed_lessons.contains(&lesson_id) {
            let mut completed = enrollment.completed_lessons.clone();
            completed.push(lesson_id);
            self.enrollment_repo
                .set_completed_lessons(enrollment.id, &completed)
                .await
                .context("Failed to update completed lessons")?;
        }

        self.progress(student, lesson.course_id).await
    }

    /// The student's active enrollment for a course, or `NotEnrolled`
    pub async fn require_active_enrollment(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Enrollment, EnrollmentError> {
        self.enrollment_repo
            .get_by_student_and_course(student_id, course_id)
            .await
            .context("Failed to get enrollment")?
            .filter(|e| e.is_active())
            .ok_or(EnrollmentError::NotEnrolled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::course::tests::{create_instructor, test_course};
    use crate::db::repositories::enrollment::tests::create_student;
    use crate::db::repositories::lesson::tests::test_lesson;
    use crate::db::repositories::{
        ChapterRepository, SqlxChapterRepository, SqlxCourseRepository, SqlxEnrollmentRepository,
        SqlxLessonRepository, SqlxPaymentRepository, SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, run_migrations};
    use crate::models::{Chapter, UserRole};
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, EnrollmentService) {
        let pool = create_test_pool().await.expect("Failed to create pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        let service = EnrollmentService::new(
            SqlxEnrollmentRepository::boxed(pool.clone()),
            SqlxCourseRepository::boxed(pool.clone()),
            SqlxLessonRepository::boxed(pool.clone()),
            SqlxPaymentRepository::boxed(pool.clone()),
            create_cache(&CacheConfig::default()),
            PaymentConfig::default(),
        );
        (pool, service)
    }

    async fn get_user(pool: &SqlitePool, id: i64) -> User {
        SqlxUserRepository::new(pool.clone())
            .get_by_id(id)
            .await
            .unwrap()
            .unwrap()
    }

    async fn published_course(pool: &SqlitePool, slug: &str, price: i64) -> Course {
        let instructor_id = create_instructor(pool, &format!("{}_inst", slug.replace('-', "_"))).await;
        let mut course = test_course(slug, instructor_id, CourseStatus::Published);
        course.price = price;
        SqlxCourseRepository::new(pool.clone())
            .create(&course)
            .await
            .expect("Failed to create course")
    }

    #[tokio::test]
    async fn test_free_course_activates_immediately() {
        let (pool, service) = setup().await;
        let student = get_user(&pool, create_student(&pool, "stud").await).await;
        let course = published_course(&pool, "free-course", 0).await;

        let outcome = service.enroll(&student, course.id).await.expect("Enroll failed");
        assert_eq!(outcome.enrollment.status, EnrollmentStatus::Active);
        assert!(outcome.checkout.is_none());

        let refreshed = SqlxCourseRepository::new(pool)
            .get_by_id(course.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.enrolled_count, 1);
    }

    #[tokio::test]
    async fn test_paid_course_creates_pending_with_checkout() {
        let (pool, service) = setup().await;
        let student = get_user(&pool, create_student(&pool, "stud").await).await;
        let course = published_course(&pool, "paid-course", 4900).await;

        let outcome = service.enroll(&student, course.id).await.expect("Enroll failed");
        assert_eq!(outcome.enrollment.status, EnrollmentStatus::Pending);

        let checkout = outcome.checkout.expect("Paid course should return checkout");
        assert_eq!(checkout.amount, 4900);
        assert!(checkout.redirect_url.contains(&checkout.reference));

        let payment = SqlxPaymentRepository::new(pool.clone())
            .get_by_reference(&checkout.reference)
            .await
            .unwrap()
            .expect("Payment should exist");
        assert_eq!(payment.status, PaymentStatus::Initiated);

        // Pending enrollment does not bump the counter
        let refreshed = SqlxCourseRepository::new(pool)
            .get_by_id(course.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(refreshed.enrolled_count, 0);
    }

    #[tokio::test]
    async fn test_cannot_enroll_twice() {
        let (pool, service) = setup().await;
        let student = get_user(&pool, create_student(&pool, "stud").await).await;
        let course = published_course(&pool, "once", 0).await;

        service.enroll(&student, course.id).await.unwrap();
        let result = service.enroll(&student, course.id).await;
        assert!(matches!(result, Err(EnrollmentError::AlreadyEnrolled)));
    }

    #[tokio::test]
    async fn test_cannot_enroll_in_draft() {
        let (pool, service) = setup().await;
        let student = get_user(&pool, create_student(&pool, "stud").await).await;
        let instructor_id = create_instructor(&pool, "draft_inst").await;
        let course = SqlxCourseRepository::new(pool.clone())
            .create(&test_course("draft-course", instructor_id, CourseStatus::Draft))
            .await
            .unwrap();

        let result = service.enroll(&student, course.id).await;
        assert!(matches!(result, Err(EnrollmentError::NotPublished)));
    }

    #[tokio::test]
    async fn test_complete_lesson_idempotent_progress() {
        let (pool, service) = setup().await;
        let student = get_user(&pool, create_student(&pool, "stud").await).await;
        let course = published_course(&pool, "progress-course", 0).await;

        let chapter = SqlxChapterRepository::new(pool.clone())
            .create(&Chapter {
                id: 0,
                course_id: course.id,
                title: "Chapter".to_string(),
                sort_order: 0,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let lesson_repo = SqlxLessonRepository::new(pool.clone());
        let first = lesson_repo
            .create(&test_lesson(chapter.id, course.id, "One", 0))
            .await
            .unwrap();
        lesson_repo
            .create(&test_lesson(chapter.id, course.id, "Two", 1))
            .await
            .unwrap();

        service.enroll(&student, course.id).await.unwrap();

        let progress = service.complete_lesson(&student, first.id).await.unwrap();
        assert_eq!(progress.completed_lessons, 1);
        assert_eq!(progress.total_lessons, 2);
        assert_eq!(progress.progress_percent, 50);

        // Completing again changes nothing
        let progress = service.complete_lesson(&student, first.id).await.unwrap();
        assert_eq!(progress.completed_lessons, 1);
        assert_eq!(progress.progress_percent, 50);
    }

    #[tokio::test]
    async fn test_complete_lesson_requires_active_enrollment() {
        let (pool, service) = setup().await;
        let student = get_user(&pool, create_student(&pool, "stud").await).await;
        let course = published_course(&pool, "paid-gate", 4900).await;

        let chapter = SqlxChapterRepository::new(pool.clone())
            .create(&Chapter {
                id: 0,
                course_id: course.id,
                title: "Chapter".to_string(),
                sort_order: 0,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let lesson = SqlxLessonRepository::new(pool.clone())
            .create(&test_lesson(chapter.id, course.id, "Locked", 0))
            .await
            .unwrap();

        // Pending enrollment is not enough
        service.enroll(&student, course.id).await.unwrap();
        let result = service.complete_lesson(&student, lesson.id).await;
        assert!(matches!(result, Err(EnrollmentError::NotEnrolled)));
    }

    #[tokio::test]
    async fn test_list_with_progress() {
        let (pool, service) = setup().await;
        let student = get_user(&pool, create_student(&pool, "stud").await).await;
        let free = published_course(&pool, "list-free", 0).await;
        let paid = published_course(&pool, "list-paid", 1000).await;

        service.enroll(&student, free.id).await.unwrap();
        service.enroll(&student, paid.id).await.unwrap();

        let list = service.list_with_progress(&student).await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().any(|p| p.course.id == free.id && p.enrollment.is_active()));
        assert!(list.iter().any(|p| p.course.id == paid.id && !p.enrollment.is_active()));
    }

    #[tokio::test]
    async fn test_instructor_can_enroll_as_learner() {
        let (pool, service) = setup().await;
        let course = published_course(&pool, "open-to-all", 0).await;
        let other_inst = create_instructor(&pool, "learner_inst").await;
        let user = get_user(&pool, other_inst).await;
        assert_eq!(user.role, UserRole::Instructor);

        let outcome = service.enroll(&user, course.id).await.expect("Enroll failed");
        assert!(outcome.enrollment.is_active());
    }
}
