//! Repository layer
//!
//! Data access traits and their SQLx implementations. Services depend on the
//! traits; the SQLx types are constructed once at startup.

pub mod category;
pub mod chapter;
pub mod content_block;
pub mod course;
pub mod enrollment;
pub mod faq;
pub mod lesson;
pub mod payment;
pub mod quiz;
pub mod review;
pub mod session;
pub mod settings;
pub mod user;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use chapter::{ChapterRepository, SqlxChapterRepository};
pub use content_block::{ContentBlockRepository, SqlxContentBlockRepository};
pub use course::{CourseRepository, SqlxCourseRepository};
pub use enrollment::{EnrollmentRepository, SqlxEnrollmentRepository};
pub use faq::{FaqRepository, SqlxFaqRepository};
pub use lesson::{LessonRepository, SqlxLessonRepository};
pub use payment::{PaymentRepository, SqlxPaymentRepository};
pub use quiz::{QuizRepository, SqlxQuizRepository};
pub use review::{ReviewRepository, SqlxReviewRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use settings::{SettingsRepository, SqlxSettingsRepository};
pub use user::{SqlxUserRepository, UserRepository};
