//! Services layer - Business logic
//!
//! This module contains all business logic services for the platform.
//! Services are responsible for:
//! - Implementing business rules
//! - Coordinating between repositories and cache
//! - Handling validation and error cases

pub mod content;
pub mod course;
pub mod enrollment;
pub mod password;
pub mod payment;
pub mod quiz;
pub mod review;
pub mod settings;
pub mod user;

pub use content::{ContentError, ContentService};
pub use course::{ChapterOutline, CourseService, CourseServiceError};
pub use enrollment::{
    CheckoutInfo, EnrollmentError, EnrollmentOutcome, EnrollmentProgress, EnrollmentService,
};
pub use password::{hash_password, verify_password};
pub use payment::{PaymentError, PaymentService};
pub use quiz::{QuizError, QuizResult, QuizService, StudentQuestion};
pub use review::{ReviewError, ReviewService};
pub use settings::{SettingsError, SettingsService, SiteSettings};
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
