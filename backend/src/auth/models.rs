//! Data structures for authentication-related entities.
//!
//! This module defines models for login requests and responses, the
//! authenticated request identity, and the authority set resolved for a
//! verified token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use validator::Validate;

use crate::database::models::{User, UserStatus};
use crate::utils::jwt::Claims;

/// Login request payload.
///
/// Ephemeral credential envelope: lives for the duration of one login call
/// and is never persisted. `Debug` redacts the password so it cannot reach
/// logs.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username must be between 3-50 characters"
    ))]
    pub username: String,

    #[validate(length(
        min = 6,
        max = 100,
        message = "Password must be between 6-100 characters"
    ))]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login response containing the token and an identity snapshot.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
    /// Token lifetime in milliseconds.
    pub expires_in: u64,
    pub expiration_time: DateTime<Utc>,
}

/// User information returned in the login response.
///
/// A snapshot of the account record minus the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Authority granted to an authenticated subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Authority {
    User,
}

/// Resolves the authority set for a verified token.
///
/// Every authenticated subject holds the single fixed `User` authority
/// today; richer role assignment plugs in here.
pub fn authorities_for(_claims: &Claims) -> HashSet<Authority> {
    HashSet::from([Authority::User])
}

/// Request-scoped identity attached by the authentication gate.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub authorities: HashSet<Authority>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subject_gets_the_fixed_user_authority() {
        let claims = Claims {
            sub: "user-1".to_string(),
            jti: "nonce".to_string(),
            iat: 0,
            exp: 0,
        };

        let authorities = authorities_for(&claims);
        assert_eq!(authorities, HashSet::from([Authority::User]));
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            username: "alice".to_string(),
            password: "secret123".to_string(),
        };

        let rendered = format!("{:?}", request);
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("secret123"));
    }
}
