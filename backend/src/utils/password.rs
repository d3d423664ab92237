//! Password hashing utilities.
//!
//! Thin wrapper around bcrypt. The produced hash record is self-describing
//! (algorithm tag, cost factor, and salt are embedded), so verification needs
//! no external state.

use bcrypt::{BcryptError, DEFAULT_COST, hash, verify};

/// Hashes a plaintext password with a fresh random salt.
///
/// Two calls on the same input produce different records.
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Hashes with an explicit cost factor. Lower costs are useful where the
/// deliberate slowness of the default is unwanted.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, BcryptError> {
    hash(password, cost)
}

/// Verifies a plaintext password against a stored hash record.
///
/// The comparison is constant-time. A malformed hash record yields `false`
/// rather than an error; callers never need to distinguish the two.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    verify(password, hashed).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_is_non_deterministic_but_verifiable() {
        let first = hash_password_with_cost("secret123", TEST_COST).unwrap();
        let second = hash_password_with_cost("secret123", TEST_COST).unwrap();

        assert_ne!(first, second);
        assert!(verify_password("secret123", &first));
        assert!(verify_password("secret123", &second));
    }

    #[test]
    fn test_wrong_password_does_not_verify() {
        let hashed = hash_password_with_cost("secret123", TEST_COST).unwrap();
        assert!(!verify_password("wrong", &hashed));
    }

    #[test]
    fn test_malformed_hash_record_verifies_false() {
        assert!(!verify_password("secret123", "not-a-bcrypt-record"));
        assert!(!verify_password("secret123", ""));
    }
}
