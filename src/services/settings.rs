//! Settings service
//!
//! Business logic for the site-wide key/value settings the admin panel
//! exposes. A typed `SiteSettings` view sits on top of the raw store with
//! defaults for every field.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::repositories::SettingsRepository;
use crate::models::Setting;

/// Known setting keys
pub mod keys {
    pub const SITE_NAME: &str = "site_name";
    pub const SITE_DESCRIPTION: &str = "site_description";
    pub const SUPPORT_EMAIL: &str = "support_email";
    pub const COURSES_PER_PAGE: &str = "courses_per_page";
}

/// Typed view over the site settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSettings {
    /// Site display name
    pub site_name: String,
    /// Short description shown on marketing pages
    pub site_description: String,
    /// Contact address shown in the footer
    pub support_email: String,
    /// Catalog page size
    pub courses_per_page: u32,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "CourseHub".to_string(),
            site_description: "Online courses for everyone".to_string(),
            support_email: String::new(),
            courses_per_page: 12,
        }
    }
}

/// Settings service errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Invalid setting key or value
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Settings service
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    /// Create a new settings service
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Get the typed site settings, falling back to defaults for unset keys
    pub async fn get_site_settings(&self) -> Result<SiteSettings, SettingsError> {
        let stored: HashMap<String, String> = self
            .repo
            .get_all()
            .await
            .context("Failed to load settings")?
            .into_iter()
            .map(|s| (s.key, s.value))
            .collect();

        let defaults = SiteSettings::default();
        Ok(SiteSettings {
            site_name: stored
                .get(keys::SITE_NAME)
                .cloned()
                .unwrap_or(defaults.site_name),
            site_description: stored
                .get(keys::SITE_DESCRIPTION)
                .cloned()
                .unwrap_or(defaults.site_description),
            support_email: stored
                .get(keys::SUPPORT_EMAIL)
                .cloned()
                .unwrap_or(defaults.support_email),
            courses_per_page: stored
                .get(keys::COURSES_PER_PAGE)
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.courses_per_page),
        })
    }

    /// Replace the typed site settings
    pub async fn update_site_settings(
        &self,
        settings: &SiteSettings,
    ) -> Result<(), SettingsError> {
        if settings.site_name.trim().is_empty() {
            return Err(SettingsError::ValidationError(
                "Site name cannot be empty".to_string(),
            ));
        }

        self.repo
            .set(keys::SITE_NAME, &settings.site_name)
            .await
            .context("Failed to save site name")?;
        self.repo
            .set(keys::SITE_DESCRIPTION, &settings.site_description)
            .await
            .context("Failed to save site description")?;
        self.repo
            .set(keys::SUPPORT_EMAIL, &settings.support_email)
            .await
            .context("Failed to save support email")?;
        self.repo
            .set(keys::COURSES_PER_PAGE, &settings.courses_per_page.to_string())
            .await
            .context("Failed to save page size")?;
        Ok(())
    }

    /// Get a single raw setting value
    pub async fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self
            .repo
            .get(key)
            .await
            .context("Failed to load setting")?
            .map(|s| s.value))
    }

    /// Set a single raw setting value
    pub async fn set(&self, key: &str, value: &str) -> Result<Setting, SettingsError> {
        if key.trim().is_empty() {
            return Err(SettingsError::ValidationError(
                "Setting key cannot be empty".to_string(),
            ));
        }
        Ok(self
            .repo
            .set(key, value)
            .await
            .context("Failed to save setting")?)
    }

    /// All raw settings
    pub async fn get_all(&self) -> Result<Vec<Setting>, SettingsError> {
        Ok(self.repo.get_all().await.context("Failed to load settings")?)
    }
}
