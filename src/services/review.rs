//! Review service
//!
//! Business logic for course reviews. A student with an active enrollment
//! can leave one review per course; resubmitting replaces it. The course
//! row mirrors the rating aggregates, maintained here through deltas so the
//! catalog never has to join the review table.

use crate::cache::{CacheLayer, MemoryCache};
use crate::db::repositories::{CourseRepository, EnrollmentRepository, ReviewRepository};
use crate::models::{CourseReview, ListParams, PagedResult, ReviewInput, User};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;

/// Error types for review service operations
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Course or review not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// No active enrollment for the course
    #[error("No active enrollment")]
    NotEnrolled,

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Review service
pub struct ReviewService {
    review_repo: Arc<dyn ReviewRepository>,
    course_repo: Arc<dyn CourseRepository>,
    enrollment_repo: Arc<dyn EnrollmentRepository>,
    cache: Arc<MemoryCache>,
}

impl ReviewService {
    /// Create a new review service
    pub fn new(
        review_repo: Arc<dyn ReviewRepository>,
        course_repo: Arc<dyn CourseRepository>,
        enrollment_repo: Arc<dyn EnrollmentRepository>,
        cache: Arc<MemoryCache>,
    ) -> Self {
        Self {
            review_repo,
            course_repo,
            enrollment_repo,
            cache,
        }
    }

    /// Reviews of a course, newest first (public)
    pub async fn list_by_course(
        &self,
        course_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<CourseReview>, ReviewError> {
        Ok(self
            .review_repo
            .list_by_course(course_id, params)
            .await
            .context("Failed to list reviews")?)
    }

    /// The student's own review of a course, if any
    pub async fn get_own(
        &self,
        student: &User,
        course_id: i64,
    ) -> Result<Option<CourseReview>, ReviewError> {
        Ok(self
            .review_repo
            .get_by_student_and_course(student.id, course_id)
            .await
            .context("Failed to get review")?)
    }

    /// Create or replace the student's review of a course.
    ///
    /// Requires an active enrollment. Course aggregates are adjusted by the
    /// rating delta.
    pub async fn upsert(
        &self,
        student: &User,
        course_id: i64,
        input: ReviewInput,
    ) -> Result<CourseReview, ReviewError> {
        if !input.is_rating_valid() {
            return Err(ReviewError::ValidationError(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        self.course_repo
            .get_by_id(course_id)
            .await
            .context("Failed to get course")?
            .ok_or_else(|| ReviewError::NotFound(format!("Course {}", course_id)))?;

        self.enrollment_repo
            .get_by_student_and_course(student.id, course_id)
            .await
            .context("Failed to get enrollment")?
            .filter(|e| e.is_active())
            .ok_or(ReviewError::NotEnrolled)?;

        let existing = self
            .review_repo
            .get_by_student_and_course(student.id, course_id)
            .await
            .context("Failed to get review")?;

        let comment = input.comment.unwrap_or_default();
        let review = match existing {
            Some(mut review) => {
                let delta = (input.rating - review.rating) as i64;
                review.rating = input.rating;
                review.comment = comment;
                let updated = self
                    .review_repo
                    .update(&review)
                    .await
                    .context("Failed to update review")?;
                if delta != 0 {
                    self.course_repo
                        .apply_review_delta(course_id, delta, 0)
                        .await
                        .context("Failed to adjust rating aggregates")?;
                }
                updated
            }
            None => {
                let now = Utc::now();
                let created = self
                    .review_repo
                    .create(&CourseReview {
                        id: 0,
                        student_id: student.id,
                        course_id,
                        rating: input.rating,
                        comment,
                        created_at: now,
                        updated_at: now,
                    })
                    .await
                    .context("Failed to create review")?;
                self.course_repo
                    .apply_review_delta(course_id, input.rating as i64, 1)
                    .await
                    .context("Failed to adjust rating aggregates")?;
                created
            }
        };

        let _ = self.cache.delete_pattern("courses:*").await;
        Ok(review)
    }

    /// Delete the student's own review and roll its rating out of the
    /// course aggregates
    pub async fn delete_own(&self, student: &User, course_id: i64) -> Result<(), ReviewError> {
        let review = self
            .review_repo
            .get_by_student_and_course(student.id, course_id)
            .await
            .context("Failed to get review")?
            .ok_or_else(|| ReviewError::NotFound("Review".to_string()))?;

        self.review_repo
            .delete(review.id)
            .await
            .context("Failed to delete review")?;
        self.course_repo
            .apply_review_delta(course_id, -(review.rating as i64), -1)
            .await
            .context("Failed to adjust rating aggregates")?;

        let _ = self.cache.delete_pattern("courses:*").await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::course::tests::{create_instructor, setup_pool, test_course};
    use crate::db::repositories::enrollment::tests::create_student;
    use crate::db::repositories::{
        EnrollmentRepository as _, SqlxCourseRepository, SqlxEnrollmentRepository,
        SqlxReviewRepository, SqlxUserRepository, UserRepository,
    };
    use crate::models::{CourseStatus, Enrollment, EnrollmentStatus};
    use sqlx::SqlitePool;

    async fn setup() -> (SqlitePool, ReviewService) {
        let pool = setup_pool().await;
        let service = ReviewService::new(
            SqlxReviewRepository::boxed(pool.clone()),
            SqlxCourseRepository::boxed(pool.clone()),
            SqlxEnrollmentRepository::boxed(pool.clone()),
            create_cache(&CacheConfig::default()),
        );
        (pool, service)
    }

    async fn enrolled_student(pool: &SqlitePool, username: &str, course_id: i64) -> User {
        let student_id = create_student(pool, username).await;
        let now = Utc::now();
        SqlxEnrollmentRepository::new(pool.clone())
            .create(&Enrollment {
                id: 0,
                student_id,
                course_id,
                status: EnrollmentStatus::Active,
                completed_lessons: Vec::new(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        SqlxUserRepository::new(pool.clone())
            .get_by_id(student_id)
            .await
            .unwrap()
            .unwrap()
    }

    async fn create_course(pool: &SqlitePool, slug: &str) -> i64 {
        let instructor_id =
            create_instructor(pool, &format!("{}_inst", slug.replace('-', "_"))).await;
        SqlxCourseRepository::new(pool.clone())
            .create(&test_course(slug, instructor_id, CourseStatus::Published))
            .await
            .unwrap()
            .id
    }

    async fn aggregates(pool: &SqlitePool, course_id: i64) -> (i64, i64) {
        let course = SqlxCourseRepository::new(pool.clone())
            .get_by_id(course_id)
            .await
            .unwrap()
            .unwrap();
        (course.rating_sum, course.rating_count)
    }

    fn input(rating: i32) -> ReviewInput {
        ReviewInput {
            rating,
            comment: Some("Good stuff".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_review_updates_aggregates() {
        let (pool, service) = setup().await;
        let course_id = create_course(&pool, "rated").await;
        let student = enrolled_student(&pool, "rater", course_id).await;

        let review = service.upsert(&student, course_id, input(4)).await.unwrap();
        assert_eq!(review.rating, 4);
        assert_eq!(aggregates(&pool, course_id).await, (4, 1));
    }

    #[tokio::test]
    async fn test_resubmit_applies_delta_not_duplicate() {
        let (pool, service) = setup().await;
        let course_id = create_course(&pool, "revised").await;
        let student = enrolled_student(&pool, "rater", course_id).await;

        service.upsert(&student, course_id, input(2)).await.unwrap();
        service.upsert(&student, course_id, input(5)).await.unwrap();

        assert_eq!(aggregates(&pool, course_id).await, (5, 1));

        let page = service
            .list_by_course(course_id, &ListParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].rating, 5);
    }

    #[tokio::test]
    async fn test_requires_active_enrollment() {
        let (pool, service) = setup().await;
        let course_id = create_course(&pool, "locked").await;
        let outsider_id = create_student(&pool, "outsider").await;
        let outsider = SqlxUserRepository::new(pool.clone())
            .get_by_id(outsider_id)
            .await
            .unwrap()
            .unwrap();

        let result = service.upsert(&outsider, course_id, input(5)).await;
        assert!(matches!(result, Err(ReviewError::NotEnrolled)));
    }

    #[tokio::test]
    async fn test_invalid_rating_rejected() {
        let (pool, service) = setup().await;
        let course_id = create_course(&pool, "strict").await;
        let student = enrolled_student(&pool, "rater", course_id).await;

        assert!(matches!(
            service.upsert(&student, course_id, input(0)).await,
            Err(ReviewError::ValidationError(_))
        ));
        assert!(matches!(
            service.upsert(&student, course_id, input(6)).await,
            Err(ReviewError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_rolls_back_aggregates() {
        let (pool, service) = setup().await;
        let course_id = create_course(&pool, "undone").await;
        let alice = enrolled_student(&pool, "alice", course_id).await;
        let bob = enrolled_student(&pool, "bob", course_id).await;

        service.upsert(&alice, course_id, input(5)).await.unwrap();
        service.upsert(&bob, course_id, input(3)).await.unwrap();
        assert_eq!(aggregates(&pool, course_id).await, (8, 2));

        service.delete_own(&alice, course_id).await.unwrap();
        assert_eq!(aggregates(&pool, course_id).await, (3, 1));

        let result = service.delete_own(&alice, course_id).await;
        assert!(matches!(result, Err(ReviewError::NotFound(_))));
    }
}
