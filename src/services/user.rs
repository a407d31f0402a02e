//! User service
//!
//! Business logic for accounts and authentication: registration (the first
//! registered user becomes admin), login/logout, session validation, and
//! admin-side user management.

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{
    ListParams, PagedResult, Session, UpdateUserInput, User, UserRole, UserStatus,
};
use crate::services::password::{hash_password, verify_password};
use anyhow::Context;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for user registration
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Input for user login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    /// Username or email address
    pub username_or_email: String,
    /// Plaintext password
    pub password: String,
}

/// User service for managing users and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Register a new user.
    ///
    /// The first user in the system is assigned the admin role; everyone
    /// after that starts as a student.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if username, email, or password is unusable
    /// - `UserExists` if username or email is already taken
    /// - `InternalError` for database errors
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserServiceError> {
        self.validate_register_input(&input)?;

        if self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to check username")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        if self
            .user_repo
            .get_by_email(&input.email)
            .await
            .context("Failed to check email")?
            .is_some()
        {
            return Err(UserServiceError::UserExists(format!(
                "Email '{}' is already registered",
                input.email
            )));
        }

        let role = if self.is_first_user().await? {
            UserRole::Admin
        } else {
            UserRole::Student
        };

        let password_hash = hash_password(&input.password).context("Failed to hash password")?;
        let user = User::new(input.username, input.email, password_hash, role);

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!(user_id = created.id, role = %created.role, "User registered");
        Ok(created)
    }

    /// Login with username or email and password.
    ///
    /// Creates a new session on success.
    ///
    /// # Errors
    ///
    /// - `AuthenticationError` for bad credentials or banned accounts
    /// - `InternalError` for database errors
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let user = self
            .find_by_username_or_email(&input.username_or_email)
            .await?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid username or password".to_string())
            })?;

        let password_valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !password_valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        if user.is_banned() {
            return Err(UserServiceError::AuthenticationError(
                "Your account has been banned. Please contact the administrator.".to_string(),
            ));
        }

        self.create_session(user.id).await
    }

    /// Logout (invalidate the session)
    pub async fn logout(&self, session_id: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(session_id)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Validate a session token and return the associated user.
    ///
    /// Expired sessions are deleted on the way out. Returns `None` for
    /// missing, expired, or banned-user sessions.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to get session")?
        {
            Some(s) => s,
            None => return Ok(None),
        };

        if session.is_expired() {
            let _ = self.session_repo.delete(token).await;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to get user")?;

        Ok(user.filter(|u| u.is_active()))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user by ID")?)
    }

    /// List users with pagination
    pub async fn list(&self, params: &ListParams) -> Result<PagedResult<User>, UserServiceError> {
        let users = self
            .user_repo
            .list(params)
            .await
            .context("Failed to list users")?;
        Ok(users)
    }

    /// Update profile fields of a user.
    ///
    /// A new username or email must not collide with another account. A new
    /// password is re-hashed.
    pub async fn update_profile(
        &self,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        let mut user = self
            .user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::UserNotFound)?;

        if let Some(username) = input.username {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(UserServiceError::ValidationError(
                    "Username cannot be empty".to_string(),
                ));
            }
            if let Some(other) = self
                .user_repo
                .get_by_username(&username)
                .await
                .context("Failed to check username")?
            {
                if other.id != id {
                    return Err(UserServiceError::UserExists(format!(
                        "Username '{}' is already taken",
                        username
                    )));
                }
            }
            user.username = username;
        }

        if let Some(email) = input.email {
            let email = email.trim().to_string();
            if !email.contains('@') {
                return Err(UserServiceError::ValidationError(
                    "Invalid email address".to_string(),
                ));
            }
            if let Some(other) = self
                .user_repo
                .get_by_email(&email)
                .await
                .context("Failed to check email")?
            {
                if other.id != id {
                    return Err(UserServiceError::UserExists(format!(
                        "Email '{}' is already registered",
                        email
                    )));
                }
            }
            user.email = email;
        }

        if let Some(password) = input.password {
            if password.len() < 8 {
                return Err(UserServiceError::ValidationError(
                    "Password must be at least 8 characters".to_string(),
                ));
            }
            user.password_hash = hash_password(&password).context("Failed to hash password")?;
        }

        Ok(self
            .user_repo
            .update(&user)
            .await
            .context("Failed to update user")?)
    }

    /// Change a user's role (admin operation)
    pub async fn set_role(&self, id: i64, role: UserRole) -> Result<User, UserServiceError> {
        self.require_exists(id).await?;
        self.user_repo
            .update_role(id, role)
            .await
            .context("Failed to update role")?;
        self.get_by_id(id).await?.ok_or(UserServiceError::UserNotFound)
    }

    /// Ban or unban a user (admin operation).
    ///
    /// Banning also drops all of the user's sessions.
    pub async fn set_status(&self, id: i64, status: UserStatus) -> Result<User, UserServiceError> {
        self.require_exists(id).await?;
        self.user_repo
            .update_status(id, status)
            .await
            .context("Failed to update status")?;

        if status == UserStatus::Banned {
            let dropped = self
                .session_repo
                .delete_for_user(id)
                .await
                .context("Failed to drop sessions")?;
            tracing::info!(user_id = id, sessions = dropped, "Banned user, sessions dropped");
        }

        self.get_by_id(id).await?.ok_or(UserServiceError::UserNotFound)
    }

    /// Check if this is the first user (for auto-admin)
    pub async fn is_first_user(&self) -> Result<bool, UserServiceError> {
        let count = self.user_repo.count().await.context("Failed to count users")?;
        Ok(count == 0)
    }

    async fn require_exists(&self, id: i64) -> Result<(), UserServiceError> {
        self.user_repo
            .get_by_id(id)
            .await
            .context("Failed to get user")?
            .ok_or(UserServiceError::UserNotFound)?;
        Ok(())
    }

    async fn find_by_username_or_email(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, UserServiceError> {
        if username_or_email.contains('@') {
            Ok(self
                .user_repo
                .get_by_email(username_or_email)
                .await
                .context("Failed to get user by email")?)
        } else {
            Ok(self
                .user_repo
                .get_by_username(username_or_email)
                .await
                .context("Failed to get user by username")?)
        }
    }

    async fn create_session(&self, user_id: i64) -> Result<Session, UserServiceError> {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        Ok(self
            .session_repo
            .create(&session)
            .await
            .context("Failed to create session")?)
    }

    fn validate_register_input(&self, input: &RegisterInput) -> Result<(), UserServiceError> {
        if input.username.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if !input.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "Invalid email address".to_string(),
            ));
        }
        if input.password.len() < 8 {
            return Err(UserServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        Ok(())
    }
}
