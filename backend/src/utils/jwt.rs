//! JWT token utilities for authentication and authorization.
//!
//! Provides secure token creation, validation, and claims management. Tokens
//! are stateless: validity is a pure function of the token contents and the
//! signing secret, so no server-side token store exists.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::errors::TokenError;
use crate::config::Config;

/// JWT claims carried by every issued token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    /// Random nonce; two tokens for the same subject always differ.
    pub jti: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }
}

/// JWT token utility for creating and validating tokens.
///
/// Keys are held per instance and come from an explicitly passed [`Config`],
/// so tests can run with distinct secrets side by side.
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in_seconds: u64,
}

impl JwtUtils {
    pub fn new(config: &Config) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        // No leeway: a token whose expiry has passed is expired, full stop.
        validation.leeway = 0;

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            expires_in_seconds: config.jwt_expires_in_seconds,
        }
    }

    /// Generates a token for the given user with the configured TTL.
    pub fn generate_token(&self, user_id: &str) -> Result<String, TokenError> {
        self.generate_token_with_ttl(user_id, Duration::seconds(self.expires_in_seconds as i64))
    }

    /// Generates a token with an explicit TTL.
    pub fn generate_token_with_ttl(
        &self,
        user_id: &str,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validates signature and expiry, returning the claims on success.
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(TokenError::from)
    }

    /// Reads the expiry of a token without enforcing it.
    ///
    /// The signature must still verify: claims are never trusted from an
    /// unverified token.
    pub fn expiration(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(TokenError::from)?;

        DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Malformed)
    }

    /// Whether a (signature-valid) token has passed its expiry.
    pub fn is_expired(&self, token: &str) -> Result<bool, TokenError> {
        Ok(self.expiration(token)? <= Utc::now())
    }

    /// Configured token lifetime in seconds.
    pub fn expires_in_seconds(&self) -> u64 {
        self.expires_in_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str) -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            acquire_timeout_seconds: 3,
            jwt_secret: secret.to_string(),
            jwt_expires_in_seconds: 3600,
            server_port: 0,
        }
    }

    #[test]
    fn test_issue_then_verify_carries_subject() {
        let jwt_utils = JwtUtils::new(&test_config("test-secret"));

        let token = jwt_utils.generate_token("user-42").unwrap();
        assert!(!token.is_empty());

        let claims = jwt_utils.validate_token(&token).unwrap();
        assert_eq!(claims.user_id(), "user-42");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tokens_for_same_subject_differ() {
        let jwt_utils = JwtUtils::new(&test_config("test-secret"));

        let first = jwt_utils.generate_token("user-42").unwrap();
        let second = jwt_utils.generate_token("user-42").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_zero_ttl_token_expires_with_expiry_kind() {
        let jwt_utils = JwtUtils::new(&test_config("test-secret"));
        let token = jwt_utils
            .generate_token_with_ttl("user-42", Duration::seconds(0))
            .unwrap();

        std::thread::sleep(std::time::Duration::from_secs(2));

        // Expired, not a signature problem.
        assert_eq!(
            jwt_utils.validate_token(&token).unwrap_err(),
            TokenError::Expired
        );

        // Expiry is still readable because the signature verifies.
        let expiry = jwt_utils.expiration(&token).unwrap();
        assert!(expiry <= Utc::now());
        assert!(jwt_utils.is_expired(&token).unwrap());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtUtils::new(&test_config("issuer-secret"));
        let verifier = JwtUtils::new(&test_config("other-secret"));

        let token = issuer.generate_token("user-42").unwrap();

        assert_eq!(
            verifier.validate_token(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
        // Claims must not be readable through the relaxed path either.
        assert!(verifier.expiration(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let jwt_utils = JwtUtils::new(&test_config("test-secret"));

        assert_eq!(
            jwt_utils.validate_token("not-a-token").unwrap_err(),
            TokenError::Malformed
        );
    }
}
