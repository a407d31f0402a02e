//! User model
//!
//! This module defines the User entity and related types. Users come in three
//! roles (admin, instructor, student) which determine what parts of the API
//! they can reach.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// User status (active/banned)
    pub status: UserStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this
    /// function. Use `services::password::hash_password()`.
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Check if the user is an instructor (or higher)
    pub fn is_instructor(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Instructor)
    }

    /// Check if the user can manage the given course.
    ///
    /// Admins can manage any course. Instructors can only manage courses
    /// they own.
    pub fn can_manage_course(&self, instructor_id: i64) -> bool {
        self.is_admin() || (self.role == UserRole::Instructor && self.id == instructor_id)
    }

    /// Check if the user is banned
    pub fn is_banned(&self) -> bool {
        self.status == UserStatus::Banned
    }

    /// Check if the user is active
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - full access
    Admin,
    /// Instructor - can manage own courses
    Instructor,
    /// Student - can enroll and learn
    Student,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Student
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Instructor => write!(f, "instructor"),
            UserRole::Student => write!(f, "student"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "instructor" => Ok(UserRole::Instructor),
            "student" => Ok(UserRole::Student),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// User status for account state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Active - normal access
    Active,
    /// Banned - cannot login
    Banned,
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Banned => write!(f, "banned"),
        }
    }
}

impl FromStr for UserStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "banned" => Ok(UserStatus::Banned),
            _ => Err(anyhow::anyhow!("Invalid user status: {}", s)),
        }
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Username
    pub username: String,
    /// Email address
    pub email: String,
    /// Plaintext password (will be hashed)
    pub password: String,
    /// User role (optional, defaults to Student)
    pub role: Option<UserRole>,
}

/// Input for updating a user
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New username (optional)
    pub username: Option<String>,
    /// New email (optional)
    pub email: Option<String>,
    /// New password (optional, will be hashed)
    pub password: Option<String>,
    /// New role (optional)
    pub role: Option<UserRole>,
    /// New status (optional)
    pub status: Option<UserStatus>,
}
