//! Course service
//!
//! Business logic for the course catalog: category management, course CRUD
//! with instructor ownership checks, publication state changes, and the
//! chapter/lesson/FAQ structure under each course. Public catalog reads go
//! through the cache; every mutation invalidates the `courses:*` key space.

use crate::cache::{CacheLayer, MemoryCache};
use crate::db::repositories::{
    CategoryRepository, ChapterRepository, CourseRepository, FaqRepository, LessonRepository,
};
use crate::models::{
    Chapter, Course, CourseCategory, CourseFaq, CourseFilter, CourseStatus, CreateCategoryInput,
    CreateChapterInput, CreateCourseInput, CreateFaqInput, CreateLessonInput, Lesson, ListParams,
    PagedResult, UpdateCategoryInput, UpdateChapterInput, UpdateCourseInput, UpdateFaqInput,
    UpdateLessonInput, User,
};
use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Cache TTL for single courses (1 hour)
const COURSE_CACHE_TTL_SECS: u64 = 3600;

/// Cache TTL for catalog pages (10 minutes, lists should refresh faster)
const CATALOG_CACHE_TTL_SECS: u64 = 600;

/// Cache key prefixes
const CACHE_KEY_COURSE_BY_SLUG: &str = "courses:slug:";
const CACHE_KEY_CATALOG: &str = "courses:catalog";
const CACHE_KEY_CATEGORIES: &str = "courses:categories";

/// Error types for course service operations
#[derive(Debug, thiserror::Error)]
pub enum CourseServiceError {
    /// Course, chapter, lesson, FAQ, or category not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Duplicate slug
    #[error("Slug already exists: {0}")]
    DuplicateSlug(String),

    /// Actor is not allowed to manage the course
    #[error("Not allowed to manage this course")]
    Forbidden,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// A chapter together with its lessons, in reading order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterOutline {
    /// The chapter
    pub chapter: Chapter,
    /// Lessons of the chapter in sort order
    pub lessons: Vec<Lesson>,
}

/// Course service for catalog and course structure management
pub struct CourseService {
    course_repo: Arc<dyn CourseRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    chapter_repo: Arc<dyn ChapterRepository>,
    lesson_repo: Arc<dyn LessonRepository>,
    faq_repo: Arc<dyn FaqRepository>,
    cache: Arc<MemoryCache>,
    default_currency: String,
}

impl CourseService {
    /// Create a new course service
    pub fn new(
        course_repo: Arc<dyn CourseRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        chapter_repo: Arc<dyn ChapterRepository>,
        lesson_repo: Arc<dyn LessonRepository>,
        faq_repo: Arc<dyn FaqRepository>,
        cache: Arc<MemoryCache>,
        default_currency: String,
    ) -> Self {
        Self {
            course_repo,
            category_repo,
            chapter_repo,
            lesson_repo,
            faq_repo,
            cache,
            default_currency,
        }
    }

    // ---- Public catalog ----

    /// List published courses for the catalog, with optional filters.
    ///
    /// Results are cached per page/filter combination.
    pub async fn list_published(
        &self,
        params: &ListParams,
        filter: &CourseFilter,
    ) -> Result<PagedResult<Course>, CourseServiceError> {
        let cache_key = format!(
            "{}:{}:{}:{}:{}",
            CACHE_KEY_CATALOG,
            params.page,
            params.per_page,
            filter.category_id.map(|id| id.to_string()).unwrap_or_default(),
            filter.search.as_deref().unwrap_or_default(),
        );
        if let Ok(Some(cached)) = self.cache.get::<PagedResult<Course>>(&cache_key).await {
            return Ok(cached);
        }

        let result = self
            .course_repo
            .list_published(params, filter)
            .await
            .context("Failed to list published courses")?;

        let _ = self
            .cache
            .set(&cache_key, &result, Duration::from_secs(CATALOG_CACHE_TTL_SECS))
            .await;
        Ok(result)
    }

    /// Get a published course by slug for the public detail page.
    ///
    /// Drafts and archived courses are not served here.
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Course, CourseServiceError> {
        let cache_key = format!("{}{}", CACHE_KEY_COURSE_BY_SLUG, slug);
        if let Ok(Some(course)) = self.cache.get::<Course>(&cache_key).await {
            return Ok(course);
        }

        let course = self
            .course_repo
            .get_by_slug(slug)
            .await
            .context("Failed to get course by slug")?
            .filter(|c| c.status == CourseStatus::Published)
            .ok_or_else(|| CourseServiceError::NotFound(format!("Course '{}'", slug)))?;

        let _ = self
            .cache
            .set(&cache_key, &course, Duration::from_secs(COURSE_CACHE_TTL_SECS))
            .await;
        Ok(course)
    }

    /// Get a course by ID regardless of status
    pub async fn get_by_id(&self, id: i64) -> Result<Course, CourseServiceError> {
        self.course_repo
            .get_by_id(id)
            .await
            .context("Failed to get course")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("Course {}", id)))
    }

    /// Chapters and lessons of a course, in reading order
    pub async fn outline(&self, course_id: i64) -> Result<Vec<ChapterOutline>, CourseServiceError> {
        let chapters = self
            .chapter_repo
            .list_by_course(course_id)
            .await
            .context("Failed to list chapters")?;
        let lessons = self
            .lesson_repo
            .list_by_course(course_id)
            .await
            .context("Failed to list lessons")?;

        let mut outline: Vec<ChapterOutline> = chapters
            .into_iter()
            .map(|chapter| ChapterOutline {
                chapter,
                lessons: Vec::new(),
            })
            .collect();
        for lesson in lessons {
            if let Some(entry) = outline.iter_mut().find(|o| o.chapter.id == lesson.chapter_id) {
                entry.lessons.push(lesson);
            }
        }
        Ok(outline)
    }

    /// FAQ entries of a course in sort order
    pub async fn list_faqs(&self, course_id: i64) -> Result<Vec<CourseFaq>, CourseServiceError> {
        Ok(self
            .faq_repo
            .list_by_course(course_id)
            .await
            .context("Failed to list FAQs")?)
    }

    // ---- Categories ----

    /// List all categories, cached
    pub async fn list_categories(&self) -> Result<Vec<CourseCategory>, CourseServiceError> {
        if let Ok(Some(cached)) = self.cache.get::<Vec<CourseCategory>>(CACHE_KEY_CATEGORIES).await {
            return Ok(cached);
        }

        let categories = self
            .category_repo
            .list()
            .await
            .context("Failed to list categories")?;

        let _ = self
            .cache
            .set(
                CACHE_KEY_CATEGORIES,
                &categories,
                Duration::from_secs(COURSE_CACHE_TTL_SECS),
            )
            .await;
        Ok(categories)
    }

    /// Create a category (admin operation)
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<CourseCategory, CourseServiceError> {
        let slug = normalize_slug(&input.slug)?;
        if input.name.trim().is_empty() {
            return Err(CourseServiceError::ValidationError(
                "Category name cannot be empty".to_string(),
            ));
        }
        if self
            .category_repo
            .exists_by_slug(&slug)
            .await
            .context("Failed to check category slug")?
        {
            return Err(CourseServiceError::DuplicateSlug(slug));
        }

        let category = CourseCategory {
            id: 0,
            slug,
            name: input.name.trim().to_string(),
            description: input.description.unwrap_or_default(),
            sort_order: input.sort_order.unwrap_or(0),
            created_at: Utc::now(),
        };
        let created = self
            .category_repo
            .create(&category)
            .await
            .context("Failed to create category")?;

        self.invalidate_catalog_cache().await;
        Ok(created)
    }

    /// Update a category (admin operation)
    pub async fn update_category(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<CourseCategory, CourseServiceError> {
        if !input.has_changes() {
            return Err(CourseServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        let mut category = self
            .category_repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("Category {}", id)))?;

        if let Some(slug) = input.slug {
            let slug = normalize_slug(&slug)?;
            if slug != category.slug
                && self
                    .category_repo
                    .exists_by_slug(&slug)
                    .await
                    .context("Failed to check category slug")?
            {
                return Err(CourseServiceError::DuplicateSlug(slug));
            }
            category.slug = slug;
        }
        if let Some(name) = input.name {
            category.name = name;
        }
        if let Some(description) = input.description {
            category.description = description;
        }
        if let Some(sort_order) = input.sort_order {
            category.sort_order = sort_order;
        }

        let updated = self
            .category_repo
            .update(&category)
            .await
            .context("Failed to update category")?;

        self.invalidate_catalog_cache().await;
        Ok(updated)
    }

    /// Delete a category (admin operation).
    ///
    /// Courses in the category keep existing with their category cleared by
    /// the foreign key.
    pub async fn delete_category(&self, id: i64) -> Result<(), CourseServiceError> {
        self.category_repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("Category {}", id)))?;

        self.category_repo
            .delete(id)
            .await
            .context("Failed to delete category")?;

        self.invalidate_catalog_cache().await;
        Ok(())
    }

    // ---- Instructor course management ----

    /// Courses owned by an instructor, all statuses
    pub async fn list_by_instructor(
        &self,
        instructor_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<Course>, CourseServiceError> {
        Ok(self
            .course_repo
            .list_by_instructor(instructor_id, params)
            .await
            .context("Failed to list instructor courses")?)
    }

    /// All courses regardless of status (admin operation)
    pub async fn list_all(
        &self,
        params: &ListParams,
    ) -> Result<PagedResult<Course>, CourseServiceError> {
        Ok(self
            .course_repo
            .list_all(params)
            .await
            .context("Failed to list courses")?)
    }

    /// Create a new course owned by the actor.
    ///
    /// New courses start as drafts.
    pub async fn create_course(
        &self,
        actor: &User,
        input: CreateCourseInput,
    ) -> Result<Course, CourseServiceError> {
        if !actor.is_instructor() {
            return Err(CourseServiceError::Forbidden);
        }

        let slug = normalize_slug(&input.slug)?;
        if input.title.trim().is_empty() {
            return Err(CourseServiceError::ValidationError(
                "Course title cannot be empty".to_string(),
            ));
        }
        let price = input.price.unwrap_or(0);
        if price < 0 {
            return Err(CourseServiceError::ValidationError(
                "Price cannot be negative".to_string(),
            ));
        }
        if self
            .course_repo
            .exists_by_slug(&slug)
            .await
            .context("Failed to check course slug")?
        {
            return Err(CourseServiceError::DuplicateSlug(slug));
        }
        if let Some(category_id) = input.category_id {
            self.category_repo
                .get_by_id(category_id)
                .await
                .context("Failed to get category")?
                .ok_or_else(|| CourseServiceError::NotFound(format!("Category {}", category_id)))?;
        }

        let now = Utc::now();
        let course = Course {
            id: 0,
            slug,
            title: input.title.trim().to_string(),
            summary: input.summary.unwrap_or_default(),
            description: input.description.unwrap_or_default(),
            thumbnail: input.thumbnail.unwrap_or_default(),
            price,
            currency: input.currency.unwrap_or_else(|| self.default_currency.clone()),
            instructor_id: actor.id,
            category_id: input.category_id,
            status: CourseStatus::Draft,
            enrolled_count: 0,
            rating_sum: 0,
            rating_count: 0,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .course_repo
            .create(&course)
            .await
            .context("Failed to create course")?;

        tracing::info!(course_id = created.id, instructor_id = actor.id, "Course created");
        self.invalidate_catalog_cache().await;
        Ok(created)
    }

    /// Update a course owned by the actor
    pub async fn update_course(
        &self,
        actor: &User,
        id: i64,
        input: UpdateCourseInput,
    ) -> Result<Course, CourseServiceError> {
        if !input.has_changes() {
            return Err(CourseServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        let mut course = self.get_owned_course(actor, id).await?;

        if let Some(slug) = input.slug {
            let slug = normalize_slug(&slug)?;
            if slug != course.slug
                && self
                    .course_repo
                    .exists_by_slug(&slug)
                    .await
                    .context("Failed to check course slug")?
            {
                return Err(CourseServiceError::DuplicateSlug(slug));
            }
            course.slug = slug;
        }
        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(CourseServiceError::ValidationError(
                    "Course title cannot be empty".to_string(),
                ));
            }
            course.title = title.trim().to_string();
        }
        if let Some(summary) = input.summary {
            course.summary = summary;
        }
        if let Some(description) = input.description {
            course.description = description;
        }
        if let Some(thumbnail) = input.thumbnail {
            course.thumbnail = thumbnail;
        }
        if let Some(price) = input.price {
            if price < 0 {
                return Err(CourseServiceError::ValidationError(
                    "Price cannot be negative".to_string(),
                ));
            }
            course.price = price;
        }
        if let Some(currency) = input.currency {
            course.currency = currency;
        }
        if let Some(category_id) = input.category_id {
            self.category_repo
                .get_by_id(category_id)
                .await
                .context("Failed to get category")?
                .ok_or_else(|| CourseServiceError::NotFound(format!("Category {}", category_id)))?;
            course.category_id = Some(category_id);
        }
        if let Some(status) = input.status {
            course.status = status;
        }

        let updated = self
            .course_repo
            .update(&course)
            .await
            .context("Failed to update course")?;

        self.invalidate_catalog_cache().await;
        Ok(updated)
    }

    /// Set the publication status of a course owned by the actor
    pub async fn set_status(
        &self,
        actor: &User,
        id: i64,
        status: CourseStatus,
    ) -> Result<Course, CourseServiceError> {
        let mut course = self.get_owned_course(actor, id).await?;
        course.status = status;

        let updated = self
            .course_repo
            .update(&course)
            .await
            .context("Failed to update course status")?;

        tracing::info!(course_id = id, status = %status, "Course status changed");
        self.invalidate_catalog_cache().await;
        Ok(updated)
    }

    /// Delete a course owned by the actor.
    ///
    /// Chapters, lessons, FAQs, enrollments, and reviews go with it via
    /// cascading foreign keys.
    pub async fn delete_course(&self, actor: &User, id: i64) -> Result<(), CourseServiceError> {
        self.get_owned_course(actor, id).await?;
        self.course_repo
            .delete(id)
            .await
            .context("Failed to delete course")?;

        self.invalidate_catalog_cache().await;
        Ok(())
    }

    // ---- Chapters ----

    /// Add a chapter to a course owned by the actor.
    ///
    /// Without an explicit sort order the chapter is appended at the end.
    pub async fn create_chapter(
        &self,
        actor: &User,
        course_id: i64,
        input: CreateChapterInput,
    ) -> Result<Chapter, CourseServiceError> {
        self.get_owned_course(actor, course_id).await?;
        if input.title.trim().is_empty() {
            return Err(CourseServiceError::ValidationError(
                "Chapter title cannot be empty".to_string(),
            ));
        }

        let sort_order = match input.sort_order {
            Some(order) => order,
            None => {
                self.chapter_repo
                    .max_sort_order(course_id)
                    .await
                    .context("Failed to get chapter sort order")?
                    .map(|max| max + 1)
                    .unwrap_or(0)
            }
        };

        let created = self
            .chapter_repo
            .create(&Chapter {
                id: 0,
                course_id,
                title: input.title.trim().to_string(),
                sort_order,
                created_at: Utc::now(),
            })
            .await
            .context("Failed to create chapter")?;

        self.invalidate_catalog_cache().await;
        Ok(created)
    }

    /// Update a chapter in a course owned by the actor
    pub async fn update_chapter(
        &self,
        actor: &User,
        chapter_id: i64,
        input: UpdateChapterInput,
    ) -> Result<Chapter, CourseServiceError> {
        if !input.has_changes() {
            return Err(CourseServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        let mut chapter = self
            .chapter_repo
            .get_by_id(chapter_id)
            .await
            .context("Failed to get chapter")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("Chapter {}", chapter_id)))?;
        self.get_owned_course(actor, chapter.course_id).await?;

        if let Some(title) = input.title {
            chapter.title = title;
        }
        if let Some(sort_order) = input.sort_order {
            chapter.sort_order = sort_order;
        }

        let updated = self
            .chapter_repo
            .update(&chapter)
            .await
            .context("Failed to update chapter")?;

        self.invalidate_catalog_cache().await;
        Ok(updated)
    }

    /// Delete a chapter and its lessons from a course owned by the actor
    pub async fn delete_chapter(
        &self,
        actor: &User,
        chapter_id: i64,
    ) -> Result<(), CourseServiceError> {
        let chapter = self
            .chapter_repo
            .get_by_id(chapter_id)
            .await
            .context("Failed to get chapter")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("Chapter {}", chapter_id)))?;
        self.get_owned_course(actor, chapter.course_id).await?;

        self.chapter_repo
            .delete(chapter_id)
            .await
            .context("Failed to delete chapter")?;

        self.invalidate_catalog_cache().await;
        Ok(())
    }

    // ---- Lessons ----

    /// Add a lesson to a chapter in a course owned by the actor
    pub async fn create_lesson(
        &self,
        actor: &User,
        chapter_id: i64,
        input: CreateLessonInput,
    ) -> Result<Lesson, CourseServiceError> {
        let chapter = self
            .chapter_repo
            .get_by_id(chapter_id)
            .await
            .context("Failed to get chapter")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("Chapter {}", chapter_id)))?;
        self.get_owned_course(actor, chapter.course_id).await?;

        if input.title.trim().is_empty() {
            return Err(CourseServiceError::ValidationError(
                "Lesson title cannot be empty".to_string(),
            ));
        }

        let sort_order = match input.sort_order {
            Some(order) => order,
            None => {
                self.lesson_repo
                    .max_sort_order(chapter_id)
                    .await
                    .context("Failed to get lesson sort order")?
                    .map(|max| max + 1)
                    .unwrap_or(0)
            }
        };

        let now = Utc::now();
        let created = self
            .lesson_repo
            .create(&Lesson {
                id: 0,
                chapter_id,
                course_id: chapter.course_id,
                title: input.title.trim().to_string(),
                content: input.content.unwrap_or_default(),
                video_url: input.video_url.unwrap_or_default(),
                duration_minutes: input.duration_minutes.unwrap_or(0),
                is_free_preview: input.is_free_preview.unwrap_or(false),
                sort_order,
                created_at: now,
                updated_at: now,
            })
            .await
            .context("Failed to create lesson")?;

        self.invalidate_catalog_cache().await;
        Ok(created)
    }

    /// Update a lesson in a course owned by the actor
    pub async fn update_lesson(
        &self,
        actor: &User,
        lesson_id: i64,
        input: UpdateLessonInput,
    ) -> Result<Lesson, CourseServiceError> {
        if !input.has_changes() {
            return Err(CourseServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        let mut lesson = self
            .lesson_repo
            .get_by_id(lesson_id)
            .await
            .context("Failed to get lesson")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("Lesson {}", lesson_id)))?;
        self.get_owned_course(actor, lesson.course_id).await?;

        if let Some(title) = input.title {
            lesson.title = title;
        }
        if let Some(content) = input.content {
            lesson.content = content;
        }
        if let Some(video_url) = input.video_url {
            lesson.video_url = video_url;
        }
        if let Some(duration_minutes) = input.duration_minutes {
            lesson.duration_minutes = duration_minutes;
        }
        if let Some(is_free_preview) = input.is_free_preview {
            lesson.is_free_preview = is_free_preview;
        }
        if let Some(sort_order) = input.sort_order {
            lesson.sort_order = sort_order;
        }

        let updated = self
            .lesson_repo
            .update(&lesson)
            .await
            .context("Failed to update lesson")?;

        self.invalidate_catalog_cache().await;
        Ok(updated)
    }

    /// Delete a lesson from a course owned by the actor
    pub async fn delete_lesson(
        &self,
        actor: &User,
        lesson_id: i64,
    ) -> Result<(), CourseServiceError> {
        let lesson = self
            .lesson_repo
            .get_by_id(lesson_id)
            .await
            .context("Failed to get lesson")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("Lesson {}", lesson_id)))?;
        self.get_owned_course(actor, lesson.course_id).await?;

        self.lesson_repo
            .delete(lesson_id)
            .await
            .context("Failed to delete lesson")?;

        self.invalidate_catalog_cache().await;
        Ok(())
    }

    // ---- FAQs ----

    /// Add a FAQ entry to a course owned by the actor
    pub async fn create_faq(
        &self,
        actor: &User,
        course_id: i64,
        input: CreateFaqInput,
    ) -> Result<CourseFaq, CourseServiceError> {
        self.get_owned_course(actor, course_id).await?;
        if input.question.trim().is_empty() || input.answer.trim().is_empty() {
            return Err(CourseServiceError::ValidationError(
                "Question and answer cannot be empty".to_string(),
            ));
        }

        let created = self
            .faq_repo
            .create(&CourseFaq {
                id: 0,
                course_id,
                question: input.question.trim().to_string(),
                answer: input.answer.trim().to_string(),
                sort_order: input.sort_order.unwrap_or(0),
                created_at: Utc::now(),
            })
            .await
            .context("Failed to create FAQ")?;

        self.invalidate_catalog_cache().await;
        Ok(created)
    }

    /// Update a FAQ entry in a course owned by the actor
    pub async fn update_faq(
        &self,
        actor: &User,
        faq_id: i64,
        input: UpdateFaqInput,
    ) -> Result<CourseFaq, CourseServiceError> {
        if !input.has_changes() {
            return Err(CourseServiceError::ValidationError(
                "No fields to update".to_string(),
            ));
        }

        let mut faq = self
            .faq_repo
            .get_by_id(faq_id)
            .await
            .context("Failed to get FAQ")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("FAQ {}", faq_id)))?;
        self.get_owned_course(actor, faq.course_id).await?;

        if let Some(question) = input.question {
            faq.question = question;
        }
        if let Some(answer) = input.answer {
            faq.answer = answer;
        }
        if let Some(sort_order) = input.sort_order {
            faq.sort_order = sort_order;
        }

        let updated = self
            .faq_repo
            .update(&faq)
            .await
            .context("Failed to update FAQ")?;

        self.invalidate_catalog_cache().await;
        Ok(updated)
    }

    /// Delete a FAQ entry from a course owned by the actor
    pub async fn delete_faq(&self, actor: &User, faq_id: i64) -> Result<(), CourseServiceError> {
        let faq = self
            .faq_repo
            .get_by_id(faq_id)
            .await
            .context("Failed to get FAQ")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("FAQ {}", faq_id)))?;
        self.get_owned_course(actor, faq.course_id).await?;

        self.faq_repo
            .delete(faq_id)
            .await
            .context("Failed to delete FAQ")?;

        self.invalidate_catalog_cache().await;
        Ok(())
    }

    // ---- Internals ----

    /// Load a course and verify the actor may manage it
    async fn get_owned_course(&self, actor: &User, id: i64) -> Result<Course, CourseServiceError> {
        let course = self
            .course_repo
            .get_by_id(id)
            .await
            .context("Failed to get course")?
            .ok_or_else(|| CourseServiceError::NotFound(format!("Course {}", id)))?;

        if !actor.can_manage_course(course.instructor_id) {
            return Err(CourseServiceError::Forbidden);
        }
        Ok(course)
    }

    async fn invalidate_catalog_cache(&self) {
        let _ = self.cache.delete_pattern("courses:*").await;
    }
}

/// Normalize and validate a slug: lowercase letters, digits, and hyphens.
fn normalize_slug(slug: &str) -> Result<String, CourseServiceError> {
    let slug = slug.trim().to_lowercase();
    if slug.is_empty() {
        return Err(CourseServiceError::ValidationError(
            "Slug cannot be empty".to_string(),
        ));
    }
    if !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(CourseServiceError::ValidationError(format!(
            "Invalid slug '{}': only letters, digits, and hyphens are allowed",
            slug
        )));
    }
    Ok(slug)
}
