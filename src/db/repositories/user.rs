//! User repository
//!
//! Database operations for user accounts.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait over SQLite

use crate::models::{ListParams, PagedResult, User, UserRole, UserStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List users, newest first
    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>>;

    /// Total number of users
    async fn count(&self) -> Result<i64>;

    /// Update a user
    async fn update(&self, user: &User) -> Result<User>;

    /// Update only the role
    async fn update_role(&self, id: i64, role: UserRole) -> Result<()>;

    /// Update only the status
    async fn update_status(&self, id: i64, status: UserStatus) -> Result<()>;

    /// Delete a user
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        create_user(&self.pool, user).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        get_user_by_id(&self.pool, id).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, status, created_at, updated_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by username")?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, status, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by email")?;

        match row {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, params: &ListParams) -> Result<PagedResult<User>> {
        let total = self.count().await?;

        let rows = sqlx::query(
            r#"
            SELECT id, username, email, password_hash, role, status, created_at, updated_at
            FROM users
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row_to_user(&row)?);
        }

        Ok(PagedResult::new(users, total, params))
    }

    async fn count(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;
        Ok(row.get("count"))
    }

    async fn update(&self, user: &User) -> Result<User> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, password_hash = ?, role = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(user.status.to_string())
        .bind(now)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .context("Failed to update user")?;

        get_user_by_id(&self.pool, user.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after update"))
    }

    async fn update_role(&self, id: i64, role: UserRole) -> Result<()> {
        sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.to_string())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update user role")?;
        Ok(())
    }

    async fn update_status(&self, id: i64, status: UserStatus) -> Result<()> {
        sqlx::query("UPDATE users SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.to_string())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update user status")?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?;
        Ok(())
    }
}

async fn create_user(pool: &SqlitePool, user: &User) -> Result<User> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, role, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(user.status.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    let id = result.last_insert_rowid();

    Ok(User {
        id,
        username: user.username.clone(),
        email: user.email.clone(),
        password_hash: user.password_hash.clone(),
        role: user.role,
        status: user.status,
        created_at: now,
        updated_at: now,
    })
}

async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, username, email, password_hash, role, status, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get user by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_user(&row)?)),
        None => Ok(None),
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let status_str: String = row.get("status");

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role: UserRole::from_str(&role_str)?,
        status: UserStatus::from_str(&status_str)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn test_user(username: &str, role: UserRole) -> User {
        User::new(
            username.to_string(),
            format!("{}@example.com", username),
            "hash".to_string(),
            role,
        )
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&test_user("alice", UserRole::Student))
            .await
            .expect("Failed to create user");

        assert!(created.id > 0);

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get user")
            .expect("User not found");
        assert_eq!(found.username, "alice");
        assert_eq!(found.role, UserRole::Student);
        assert_eq!(found.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn test_get_by_username_and_email() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("bob", UserRole::Instructor))
            .await
            .expect("Failed to create user");

        let by_name = repo
            .get_by_username("bob")
            .await
            .expect("Failed to get user")
            .expect("User not found");
        assert_eq!(by_name.role, UserRole::Instructor);

        let by_email = repo
            .get_by_email("bob@example.com")
            .await
            .expect("Failed to get user")
            .expect("User not found");
        assert_eq!(by_email.id, by_name.id);

        let missing = repo.get_by_username("nobody").await.expect("query failed");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_unique_username_constraint() {
        let repo = setup_test_repo().await;
        repo.create(&test_user("carol", UserRole::Student))
            .await
            .expect("Failed to create user");

        let mut dup = test_user("carol", UserRole::Student);
        dup.email = "other@example.com".to_string();
        let result = repo.create(&dup).await;
        assert!(result.is_err(), "Should fail due to duplicate username");
    }

    #[tokio::test]
    async fn test_update_role_and_status() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&test_user("dave", UserRole::Student))
            .await
            .expect("Failed to create user");

        repo.update_role(created.id, UserRole::Instructor)
            .await
            .expect("Failed to update role");
        repo.update_status(created.id, UserStatus::Banned)
            .await
            .expect("Failed to update status");

        let found = repo
            .get_by_id(created.id)
            .await
            .expect("Failed to get user")
            .expect("User not found");
        assert_eq!(found.role, UserRole::Instructor);
        assert_eq!(found.status, UserStatus::Banned);
    }

    #[tokio::test]
    async fn test_list_and_count() {
        let repo = setup_test_repo().await;
        for name in ["u1", "u2", "u3"] {
            repo.create(&test_user(name, UserRole::Student))
                .await
                .expect("Failed to create user");
        }

        assert_eq!(repo.count().await.expect("Failed to count"), 3);

        let page = repo
            .list(&ListParams::new(1, 2))
            .await
            .expect("Failed to list users");
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
        assert!(page.has_next());
    }

    #[tokio::test]
    async fn test_delete_user() {
        let repo = setup_test_repo().await;
        let created = repo
            .create(&test_user("gone", UserRole::Student))
            .await
            .expect("Failed to create user");

        repo.delete(created.id).await.expect("Failed to delete user");

        let found = repo.get_by_id(created.id).await.expect("query failed");
        assert!(found.is_none());
    }
}
