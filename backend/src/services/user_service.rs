//! User business logic service.
//!
//! Handles registration, profile management, and credential verification.

use crate::database::models::{
    CreateNewUser, CreateUser, UpdatePassword, UpdateUser, User, UserStatistics, UserStatus,
};
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::utils::password;
use crate::api::common::PaginationFilter;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

pub struct UserService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserService<'a> {
    /// Creates a new UserService instance.
    ///
    /// # Arguments
    /// * `pool` - Reference to SQLite connection pool
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user with full validation.
    ///
    /// The password hash is computed at creation; the plaintext is dropped
    /// as soon as hashing completes.
    ///
    /// # Errors
    /// Returns `ServiceError` for:
    /// - Validation failures
    /// - Duplicate username or email
    /// - Business rule violations
    pub async fn create_user(&self, create_user: CreateNewUser) -> ServiceResult<User> {
        // Input validation using validator crate
        if let Err(validation_errors) = create_user.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();

            return Err(ServiceError::validation(error_messages.join(", ")));
        }

        self.validate_business_rules(&create_user)?;

        let repo = UserRepository::new(self.pool);

        if repo.username_exists(&create_user.username).await? {
            return Err(ServiceError::already_exists("User", &create_user.username));
        }

        if repo.email_exists(&create_user.email).await? {
            return Err(ServiceError::already_exists("User", &create_user.email));
        }

        let password_hash = Self::hash_password(create_user.password).await?;

        let data = CreateUser {
            id: Uuid::new_v4().to_string(),
            username: create_user.username,
            email: create_user.email,
            password_hash,
            full_name: create_user.full_name,
            phone: create_user.phone,
        };

        let user = repo.create_user(data).await?;
        Ok(user)
    }

    /// Verifies a username/password pair against the account store.
    ///
    /// Unknown username, wrong password, and an ineligible account status
    /// all fail with the same `InvalidCredentials` error so the caller
    /// cannot enumerate accounts or probe their state. Store failures
    /// surface as `Database` errors instead, so "try again" stays
    /// distinguishable from "check your password".
    ///
    /// # Returns
    /// The matching account record, unmodified
    pub async fn authenticate_user(&self, username: &str, password: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);

        let user = repo
            .get_user_by_username(username)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let password_matches =
            Self::verify_password(password.to_string(), user.password_hash.clone()).await?;

        if !password_matches {
            return Err(ServiceError::InvalidCredentials);
        }

        if !Self::is_login_eligible(&user) {
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Password-only credential check.
    ///
    /// Deliberately does not gate on account status; `authenticate_user`
    /// does. Unknown usernames simply yield `false`.
    pub async fn validate_credentials(&self, username: &str, password: &str) -> ServiceResult<bool> {
        let repo = UserRepository::new(self.pool);

        let Some(user) = repo.get_user_by_username(username).await? else {
            return Ok(false);
        };

        Self::verify_password(password.to_string(), user.password_hash).await
    }

    /// Single definition of the login eligibility rule.
    pub fn is_login_eligible(user: &User) -> bool {
        user.status == UserStatus::Active
    }

    /// Hashes a password on the blocking pool; bcrypt is CPU-bound and must
    /// not stall request-handling threads.
    async fn hash_password(password: String) -> ServiceResult<String> {
        let hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
            .await
            .map_err(|e| ServiceError::internal(format!("Hashing task failed: {}", e)))?
            .map_err(|e| ServiceError::internal(format!("Password hashing failed: {}", e)))?;

        Ok(hash)
    }

    /// Verifies a password on the blocking pool.
    async fn verify_password(password: String, hash: String) -> ServiceResult<bool> {
        tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
            .await
            .map_err(|e| ServiceError::internal(format!("Verification task failed: {}", e)))
    }

    /// Retrieves a user by ID with existence verification.
    ///
    /// # Errors
    /// Returns `ServiceError::NotFound` if user doesn't exist
    pub async fn get_user_required(&self, id: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;
        Ok(user)
    }

    /// Retrieves a user by username with existence verification.
    pub async fn get_user_by_username_required(&self, username: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", username))?;
        Ok(user)
    }

    /// Retrieves a page of users plus the total count for pagination.
    pub async fn list_users(
        &self,
        pagination: &PaginationFilter,
        status: Option<UserStatus>,
    ) -> ServiceResult<(Vec<User>, u64)> {
        let repo = UserRepository::new(self.pool);
        let users = repo.list_users(pagination, status).await?;
        let total = repo.count_users(status).await?;
        Ok((users, total))
    }

    /// Updates the mutable profile fields of a user.
    pub async fn update_user(&self, id: &str, update: UpdateUser) -> ServiceResult<User> {
        if let Err(validation_errors) = update.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();

            return Err(ServiceError::validation(error_messages.join(", ")));
        }

        let repo = UserRepository::new(self.pool);
        let user = repo
            .update_profile(id, &update)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(user)
    }

    /// Changes a user's password after verifying the old one.
    ///
    /// # Returns
    /// `true` when the password was changed, `false` when the old password
    /// did not verify
    pub async fn update_password(&self, id: &str, update: UpdatePassword) -> ServiceResult<bool> {
        if let Err(validation_errors) = update.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();

            return Err(ServiceError::validation(error_messages.join(", ")));
        }

        let user = self.get_user_required(id).await?;

        let old_matches =
            Self::verify_password(update.old_password, user.password_hash.clone()).await?;
        if !old_matches {
            return Ok(false);
        }

        let password_hash = Self::hash_password(update.new_password).await?;

        let repo = UserRepository::new(self.pool);
        repo.update_password_hash(id, &password_hash)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(true)
    }

    /// Transitions a user to a new lifecycle status.
    pub async fn update_status(&self, id: &str, status: UserStatus) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .update_status(id, status)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(user)
    }

    /// Marks the user's email address as verified.
    pub async fn verify_email(&self, id: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .set_email_verified(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(user)
    }

    /// Marks the user's phone number as verified.
    pub async fn verify_phone(&self, id: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .set_phone_verified(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))?;

        Ok(user)
    }

    /// Soft-deletes a user by transitioning it to `Deleted`.
    pub async fn delete_user(&self, id: &str) -> ServiceResult<()> {
        self.update_status(id, UserStatus::Deleted).await?;
        Ok(())
    }

    /// Account counts per lifecycle status.
    pub async fn statistics(&self) -> ServiceResult<UserStatistics> {
        let repo = UserRepository::new(self.pool);

        Ok(UserStatistics {
            total_users: repo.count_users(None).await?,
            active_users: repo.count_users(Some(UserStatus::Active)).await?,
            inactive_users: repo.count_users(Some(UserStatus::Inactive)).await?,
            suspended_users: repo.count_users(Some(UserStatus::Suspended)).await?,
            deleted_users: repo.count_users(Some(UserStatus::Deleted)).await?,
        })
    }

    /// Business validation rules.
    fn validate_business_rules(&self, create_user: &CreateNewUser) -> ServiceResult<()> {
        // Usernames must start with a letter
        if create_user
            .username
            .chars()
            .next()
            .is_some_and(|c| !c.is_alphabetic())
        {
            return Err(ServiceError::validation(
                "Username must start with a letter",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    async fn seed_user(
        pool: &SqlitePool,
        username: &str,
        password: &str,
        status: UserStatus,
    ) -> User {
        let repo = UserRepository::new(pool);
        let user = repo
            .create_user(CreateUser {
                id: Uuid::new_v4().to_string(),
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash: password::hash_password_with_cost(password, 4).unwrap(),
                full_name: None,
                phone: None,
            })
            .await
            .unwrap();

        if status == UserStatus::Active {
            user
        } else {
            repo.update_status(&user.id, status).await.unwrap().unwrap()
        }
    }

    #[tokio::test]
    async fn test_authenticate_active_user_succeeds() {
        let pool = test_pool().await;
        let seeded = seed_user(&pool, "alice", "secret123", UserStatus::Active).await;

        let service = UserService::new(&pool);
        let user = service.authenticate_user("alice", "secret123").await.unwrap();

        assert_eq!(user.id, seeded.id);
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let pool = test_pool().await;
        seed_user(&pool, "alice", "secret123", UserStatus::Active).await;

        let service = UserService::new(&pool);

        let unknown_user = service
            .authenticate_user("nobody", "secret123")
            .await
            .unwrap_err();
        let wrong_password = service
            .authenticate_user("alice", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(unknown_user, ServiceError::InvalidCredentials));
        assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
        assert_eq!(unknown_user.to_string(), wrong_password.to_string());
    }

    #[tokio::test]
    async fn test_ineligible_status_gets_the_same_generic_error() {
        let pool = test_pool().await;
        seed_user(&pool, "bob", "secret123", UserStatus::Inactive).await;
        seed_user(&pool, "carol", "secret123", UserStatus::Suspended).await;

        let service = UserService::new(&pool);

        let inactive = service
            .authenticate_user("bob", "secret123")
            .await
            .unwrap_err();
        let suspended = service
            .authenticate_user("carol", "secret123")
            .await
            .unwrap_err();
        let wrong_password = service
            .authenticate_user("bob", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(inactive, ServiceError::InvalidCredentials));
        assert!(matches!(suspended, ServiceError::InvalidCredentials));
        assert_eq!(inactive.to_string(), wrong_password.to_string());
    }

    #[tokio::test]
    async fn test_validate_credentials_ignores_account_status() {
        let pool = test_pool().await;
        seed_user(&pool, "bob", "secret123", UserStatus::Inactive).await;

        let service = UserService::new(&pool);

        assert!(service.validate_credentials("bob", "secret123").await.unwrap());
        assert!(!service.validate_credentials("bob", "wrong").await.unwrap());
        assert!(!service.validate_credentials("nobody", "secret123").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_user_hashes_password_and_defaults_to_active() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);

        let user = service
            .create_user(CreateNewUser {
                username: "dave".to_string(),
                email: "dave@example.com".to_string(),
                password: "secret123".to_string(),
                full_name: Some("Dave Example".to_string()),
                phone: None,
            })
            .await
            .unwrap();

        assert_eq!(user.status, UserStatus::Active);
        assert_ne!(user.password_hash, "secret123");
        assert!(password::verify_password("secret123", &user.password_hash));
        assert!(!user.email_verified);
    }

    #[tokio::test]
    async fn test_create_user_rejects_duplicates() {
        let pool = test_pool().await;
        seed_user(&pool, "alice", "secret123", UserStatus::Active).await;

        let service = UserService::new(&pool);

        let duplicate_username = service
            .create_user(CreateNewUser {
                username: "alice".to_string(),
                email: "new@example.com".to_string(),
                password: "secret123".to_string(),
                full_name: None,
                phone: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(duplicate_username, ServiceError::AlreadyExists { .. }));

        let duplicate_email = service
            .create_user(CreateNewUser {
                username: "alice2".to_string(),
                email: "alice@example.com".to_string(),
                password: "secret123".to_string(),
                full_name: None,
                phone: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(duplicate_email, ServiceError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_create_user_validates_input() {
        let pool = test_pool().await;
        let service = UserService::new(&pool);

        let short_username = service
            .create_user(CreateNewUser {
                username: "ab".to_string(),
                email: "ab@example.com".to_string(),
                password: "secret123".to_string(),
                full_name: None,
                phone: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(short_username, ServiceError::Validation { .. }));

        let short_password = service
            .create_user(CreateNewUser {
                username: "eve".to_string(),
                email: "eve@example.com".to_string(),
                password: "short".to_string(),
                full_name: None,
                phone: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(short_password, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_update_password_requires_matching_old_password() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "alice", "secret123", UserStatus::Active).await;

        let service = UserService::new(&pool);

        let rejected = service
            .update_password(
                &user.id,
                UpdatePassword {
                    old_password: "wrong".to_string(),
                    new_password: "newsecret".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(!rejected);

        let changed = service
            .update_password(
                &user.id,
                UpdatePassword {
                    old_password: "secret123".to_string(),
                    new_password: "newsecret".to_string(),
                },
            )
            .await
            .unwrap();
        assert!(changed);

        service.authenticate_user("alice", "newsecret").await.unwrap();
        assert!(matches!(
            service.authenticate_user("alice", "secret123").await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_delete_user_is_a_soft_delete() {
        let pool = test_pool().await;
        let user = seed_user(&pool, "alice", "secret123", UserStatus::Active).await;

        let service = UserService::new(&pool);
        service.delete_user(&user.id).await.unwrap();

        let stored = service.get_user_required(&user.id).await.unwrap();
        assert_eq!(stored.status, UserStatus::Deleted);

        assert!(matches!(
            service.authenticate_user("alice", "secret123").await,
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_statistics_counts_by_status() {
        let pool = test_pool().await;
        seed_user(&pool, "alice", "secret123", UserStatus::Active).await;
        seed_user(&pool, "bob", "secret123", UserStatus::Inactive).await;
        seed_user(&pool, "carol", "secret123", UserStatus::Deleted).await;

        let service = UserService::new(&pool);
        let stats = service.statistics().await.unwrap();

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.active_users, 1);
        assert_eq!(stats.inactive_users, 1);
        assert_eq!(stats.suspended_users, 0);
        assert_eq!(stats.deleted_users, 1);
    }
}
