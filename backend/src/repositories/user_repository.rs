//! Database repository for user management operations.
//!
//! Provides CRUD operations for user accounts. Lookups by username are exact
//! case-sensitive matches; soft deletion is a status transition, so no query
//! here physically removes rows.

use crate::{
    api::common::PaginationFilter,
    database::models::{CreateUser, UpdateUser, User, UserStatus},
};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database.
    ///
    /// # Arguments
    /// * `user` - CreateUser record with the password already hashed
    ///
    /// # Returns
    /// The newly created User with all fields populated
    pub async fn create_user(&self, user: CreateUser) -> Result<User> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, full_name, phone, status,
                               email_verified, phone_verified, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, username, email, password_hash, full_name, phone, avatar_url, status,
                      email_verified, phone_verified, last_login_at, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.full_name)
        .bind(user.phone)
        .bind(UserStatus::Active)
        .bind(false)
        .bind(false)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their unique identifier.
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, phone, avatar_url, status,
                   email_verified, phone_verified, last_login_at, created_at, updated_at
            FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their username (exact, case-sensitive match).
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, phone, avatar_url, status,
                   email_verified, phone_verified, last_login_at, created_at, updated_at
            FROM users WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves a user by their email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, full_name, phone, avatar_url, status,
                   email_verified, phone_verified, last_login_at, created_at, updated_at
            FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Checks if a username already exists in the system.
    pub async fn username_exists(&self, username: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Checks if an email already exists in the system.
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Retrieves a page of users, optionally filtered by status.
    ///
    /// # Arguments
    /// * `pagination` - Page/per-page parameters
    /// * `status` - Restrict to one lifecycle status when set
    pub async fn list_users(
        &self,
        pagination: &PaginationFilter,
        status: Option<UserStatus>,
    ) -> Result<Vec<User>> {
        let limit = pagination.limit() as i64;
        let offset = pagination.offset() as i64;

        let users = match status {
            Some(status) => {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, username, email, password_hash, full_name, phone, avatar_url, status,
                           email_verified, phone_verified, last_login_at, created_at, updated_at
                    FROM users
                    WHERE status = ?
                    ORDER BY created_at DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, username, email, password_hash, full_name, phone, avatar_url, status,
                           email_verified, phone_verified, last_login_at, created_at, updated_at
                    FROM users
                    ORDER BY created_at DESC
                    LIMIT ? OFFSET ?
                    "#,
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(users)
    }

    /// Total number of users, optionally restricted to one status.
    pub async fn count_users(&self, status: Option<UserStatus>) -> Result<u64> {
        let count: i64 = match status {
            Some(status) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE status = ?")
                    .bind(status)
                    .fetch_one(self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(self.pool)
                    .await?
            }
        };

        Ok(count as u64)
    }

    /// Updates the mutable profile fields; absent fields keep their value.
    pub async fn update_profile(&self, id: &str, update: &UpdateUser) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = COALESCE(?, full_name),
                phone = COALESCE(?, phone),
                avatar_url = COALESCE(?, avatar_url),
                updated_at = ?
            WHERE id = ?
            RETURNING id, username, email, password_hash, full_name, phone, avatar_url, status,
                      email_verified, phone_verified, last_login_at, created_at, updated_at
            "#,
        )
        .bind(update.full_name.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.avatar_url.as_deref())
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Replaces the stored password hash.
    pub async fn update_password_hash(&self, id: &str, password_hash: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, username, email, password_hash, full_name, phone, avatar_url, status,
                      email_verified, phone_verified, last_login_at, created_at, updated_at
            "#,
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Transitions the account to a new lifecycle status.
    pub async fn update_status(&self, id: &str, status: UserStatus) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET status = ?, updated_at = ?
            WHERE id = ?
            RETURNING id, username, email, password_hash, full_name, phone, avatar_url, status,
                      email_verified, phone_verified, last_login_at, created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Marks the account email as verified.
    pub async fn set_email_verified(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email_verified = 1, updated_at = ?
            WHERE id = ?
            RETURNING id, username, email, password_hash, full_name, phone, avatar_url, status,
                      email_verified, phone_verified, last_login_at, created_at, updated_at
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Marks the account phone number as verified.
    pub async fn set_phone_verified(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET phone_verified = 1, updated_at = ?
            WHERE id = ?
            RETURNING id, username, email, password_hash, full_name, phone, avatar_url, status,
                      email_verified, phone_verified, last_login_at, created_at, updated_at
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Stamps the last-login timestamp in a single-row update.
    pub async fn record_last_login(&self, id: &str) -> Result<()> {
        let now = Utc::now();

        sqlx::query("UPDATE users SET last_login_at = ?, updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(now)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
