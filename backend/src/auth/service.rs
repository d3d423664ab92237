//! Core business logic for the authentication system.

use crate::auth::models::*;
use crate::config::Config;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::services::user_service::UserService;
use crate::utils::jwt::JwtUtils;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use validator::Validate;

/// Authentication service for handling login and credential validation.
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    jwt_utils: JwtUtils,
    user_service: UserService<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance.
    ///
    /// Signing material comes from the passed config; no global state.
    pub fn new(pool: &'a SqlitePool, config: &Config) -> Self {
        AuthService {
            pool,
            jwt_utils: JwtUtils::new(config),
            user_service: UserService::new(pool),
        }
    }

    /// Authenticate a user and issue an access token.
    ///
    /// The last-login timestamp is recorded after the token is issued;
    /// a failure there is logged and swallowed, never rolling back the
    /// already-issued token.
    pub async fn login(&self, login_request: LoginRequest) -> ServiceResult<LoginResponse> {
        // Validate input
        if let Err(validation_errors) = login_request.validate() {
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

        // Authenticate user using UserService
        let user = self
            .user_service
            .authenticate_user(&login_request.username, &login_request.password)
            .await?;

        let token = self
            .jwt_utils
            .generate_token(&user.id)
            .map_err(|e| ServiceError::internal(format!("Token generation failed: {}", e)))?;

        let expires_in_seconds = self.jwt_utils.expires_in_seconds();
        let expiration_time = Utc::now() + Duration::seconds(expires_in_seconds as i64);

        // Last-login bookkeeping must not fail the login
        let repo = UserRepository::new(self.pool);
        if let Err(e) = repo.record_last_login(&user.id).await {
            tracing::warn!("Failed to record last login for user {}: {}", user.id, e);
        }

        Ok(LoginResponse {
            token,
            user: UserInfo::from(user),
            expires_in: expires_in_seconds * 1000,
            expiration_time,
        })
    }

    /// Check whether a username/password pair matches the stored hash.
    ///
    /// Password-only: account status is deliberately not consulted, unlike
    /// `login`. Kept as a separate entry point for pre-check flows.
    pub async fn validate_credentials(&self, login_request: LoginRequest) -> ServiceResult<bool> {
        if let Err(validation_errors) = login_request.validate() {
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

        self.user_service
            .validate_credentials(&login_request.username, &login_request.password)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CreateUser, UserStatus};
    use crate::utils::password;
    use sqlx::sqlite::SqlitePoolOptions;
    use uuid::Uuid;

    fn test_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            jwt_secret: "test-secret".to_string(),
            jwt_expires_in_seconds: 3600,
            server_port: 0,
        }
    }

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!().run(&pool).await.unwrap();
        pool
    }

    async fn seed_user(pool: &SqlitePool, username: &str, password: &str, status: UserStatus) {
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

        if status != UserStatus::Active {
            repo.update_status(&user.id, status).await.unwrap().unwrap();
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_a_verifiable_token() {
        let pool = test_pool().await;
        let config = test_config();
        seed_user(&pool, "alice", "secret123", UserStatus::Active).await;

        let auth_service = AuthService::new(&pool, &config);
        let response = auth_service
            .login(login_request("alice", "secret123"))
            .await
            .unwrap();

        assert!(!response.token.is_empty());
        assert!(response.expires_in > 0);
        assert!(response.expiration_time > Utc::now());
        assert_eq!(response.user.username, "alice");

        // The issued token verifies and carries the account id as subject.
        let claims = JwtUtils::new(&config)
            .validate_token(&response.token)
            .unwrap();
        assert_eq!(claims.sub, response.user.id);
    }

    #[tokio::test]
    async fn test_login_records_last_login_timestamp() {
        let pool = test_pool().await;
        let config = test_config();
        seed_user(&pool, "alice", "secret123", UserStatus::Active).await;

        let auth_service = AuthService::new(&pool, &config);
        let response = auth_service
            .login(login_request("alice", "secret123"))
            .await
            .unwrap();

        let stored = UserRepository::new(&pool)
            .get_user_by_id(&response.user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_login_failures_share_one_error_kind_and_message() {
        let pool = test_pool().await;
        let config = test_config();
        seed_user(&pool, "alice", "secret123", UserStatus::Active).await;
        seed_user(&pool, "bob", "secret123", UserStatus::Inactive).await;

        let auth_service = AuthService::new(&pool, &config);

        let wrong_password = auth_service
            .login(login_request("alice", "wrongpass"))
            .await
            .unwrap_err();
        let unknown_user = auth_service
            .login(login_request("nobody", "secret123"))
            .await
            .unwrap_err();
        let disabled_account = auth_service
            .login(login_request("bob", "secret123"))
            .await
            .unwrap_err();

        for error in [&wrong_password, &unknown_user, &disabled_account] {
            assert!(matches!(error, ServiceError::InvalidCredentials));
            assert_eq!(error.error_code(), "AUTH_001");
        }
        assert_eq!(wrong_password.to_string(), disabled_account.to_string());
    }

    #[tokio::test]
    async fn test_login_validates_request_shape() {
        let pool = test_pool().await;
        let config = test_config();

        let auth_service = AuthService::new(&pool, &config);

        let error = auth_service
            .login(login_request("ab", "secret123"))
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::Validation { .. }));

        let error = auth_service
            .login(login_request("alice", "short"))
            .await
            .unwrap_err();
        assert!(matches!(error, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_validate_credentials_is_password_only() {
        let pool = test_pool().await;
        let config = test_config();
        seed_user(&pool, "bob", "secret123", UserStatus::Suspended).await;

        let auth_service = AuthService::new(&pool, &config);

        // Suspended account: login refuses, the password-only check passes.
        assert!(matches!(
            auth_service.login(login_request("bob", "secret123")).await,
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(
            auth_service
                .validate_credentials(login_request("bob", "secret123"))
                .await
                .unwrap()
        );
        assert!(
            !auth_service
                .validate_credentials(login_request("bob", "wrongpass"))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_repeated_validate_credentials_is_idempotent() {
        let pool = test_pool().await;
        let config = test_config();
        seed_user(&pool, "alice", "secret123", UserStatus::Active).await;

        let auth_service = AuthService::new(&pool, &config);

        for _ in 0..3 {
            assert!(
                auth_service
                    .validate_credentials(login_request("alice", "secret123"))
                    .await
                    .unwrap()
            );
        }

        // A login in between does not change the outcome.
        auth_service
            .login(login_request("alice", "secret123"))
            .await
            .unwrap();
        assert!(
            auth_service
                .validate_credentials(login_request("alice", "secret123"))
                .await
                .unwrap()
        );
    }
}
