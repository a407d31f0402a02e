//! Data models
//!
//! This module contains all data structures used throughout coursehub.
//! Models represent:
//! - Database entities (User, Course, Chapter, Lesson, Enrollment, Payment, ...)
//! - Input types consumed by services
//! - Shared pagination types

mod category;
mod chapter;
mod content_block;
mod course;
mod enrollment;
mod faq;
mod lesson;
mod payment;
mod quiz;
mod review;
mod session;
mod setting;
mod user;

pub use category::{CourseCategory, CreateCategoryInput, UpdateCategoryInput};
pub use chapter::{Chapter, CreateChapterInput, UpdateChapterInput};
pub use content_block::ContentBlock;
pub use course::{
    Course, CourseFilter, CourseStatus, CreateCourseInput, ListParams, PagedResult,
    UpdateCourseInput,
};
pub use enrollment::{Enrollment, EnrollmentStatus};
pub use faq::{CourseFaq, CreateFaqInput, UpdateFaqInput};
pub use lesson::{CreateLessonInput, Lesson, UpdateLessonInput};
pub use payment::{Payment, PaymentStatus};
pub use quiz::{CreateQuestionInput, QuizAttempt, QuizQuestion, QuizSubmission, UpdateQuestionInput};
pub use review::{CourseReview, ReviewInput};
pub use session::Session;
pub use setting::Setting;
pub use user::{CreateUserInput, UpdateUserInput, User, UserRole, UserStatus};
