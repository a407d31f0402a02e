//! Coursehub - A lightweight learning management system backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coursehub::{
    api::{self, AppState, RequestStats},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCategoryRepository, SqlxChapterRepository, SqlxContentBlockRepository,
            SqlxCourseRepository, SqlxEnrollmentRepository, SqlxFaqRepository,
            SqlxLessonRepository, SqlxPaymentRepository, SqlxQuizRepository,
            SqlxReviewRepository, SqlxSessionRepository, SqlxSettingsRepository,
            SqlxUserRepository,
        },
    },
    services::{
        ContentService, CourseService, EnrollmentService, PaymentService, QuizService,
        ReviewService, SettingsService, UserService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coursehub=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting coursehub...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Initialize cache
    let cache = create_cache(&config.cache);
    tracing::info!("Cache initialized");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let course_repo = SqlxCourseRepository::boxed(pool.clone());
    let chapter_repo = SqlxChapterRepository::boxed(pool.clone());
    let lesson_repo = SqlxLessonRepository::boxed(pool.clone());
    let faq_repo = SqlxFaqRepository::boxed(pool.clone());
    let enrollment_repo = SqlxEnrollmentRepository::boxed(pool.clone());
    let payment_repo = SqlxPaymentRepository::boxed(pool.clone());
    let quiz_repo = SqlxQuizRepository::boxed(pool.clone());
    let review_repo = SqlxReviewRepository::boxed(pool.clone());
    let content_repo = SqlxContentBlockRepository::boxed(pool.clone());
    let settings_repo = SqlxSettingsRepository::boxed(pool.clone());

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo.clone(), session_repo));
    let course_service = Arc::new(CourseService::new(
        course_repo.clone(),
        category_repo,
        chapter_repo,
        lesson_repo.clone(),
        faq_repo,
        cache.clone(),
        config.payment.currency.clone(),
    ));
    let enrollment_service = Arc::new(EnrollmentService::new(
        enrollment_repo.clone(),
        course_repo.clone(),
        lesson_repo.clone(),
        payment_repo.clone(),
        cache.clone(),
        config.payment.clone(),
    ));
    let payment_service = Arc::new(PaymentService::new(
        payment_repo,
        enrollment_repo.clone(),
        course_repo.clone(),
        cache.clone(),
    ));
    let quiz_service = Arc::new(QuizService::new(
        quiz_repo,
        lesson_repo,
        course_repo.clone(),
        enrollment_repo.clone(),
    ));
    let review_service = Arc::new(ReviewService::new(
        review_repo,
        course_repo.clone(),
        enrollment_repo.clone(),
        cache.clone(),
    ));
    let content_service = Arc::new(ContentService::new(content_repo, cache.clone()));
    let settings_service = Arc::new(SettingsService::new(settings_repo));

    // Build application state
    let state = AppState {
        pool: pool.clone(),
        user_service,
        course_service,
        enrollment_service,
        payment_service,
        quiz_service,
        review_service,
        content_service,
        settings_service,
        user_repo,
        course_repo,
        enrollment_repo,
        upload_config: Arc::new(config.upload.clone()),
        request_stats: Arc::new(RequestStats::new()),
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
