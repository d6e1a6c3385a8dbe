use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters long")]
    TooShort(usize),
    #[error("Password must be no more than {0} characters long")]
    TooLong(usize),
    #[error("Password must contain at least one letter")]
    NoLetter,
    #[error("Password must contain at least one number")]
    NoNumber,
    #[error("Failed to hash password")]
    HashingFailed,
    #[error("Failed to verify password")]
    VerificationFailed,
}

/// Password strength requirements
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_letter: bool,
    pub require_number: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            require_letter: true,
            require_number: true,
        }
    }
}

/// Validate password strength according to policy
pub fn validate_password_strength(password: &str, policy: &PasswordPolicy) -> Result<(), PasswordError> {
    let length = password.chars().count();

    if length < policy.min_length {
        return Err(PasswordError::TooShort(policy.min_length));
    }

    if length > policy.max_length {
        return Err(PasswordError::TooLong(policy.max_length));
    }

    if policy.require_letter && !password.chars().any(|c| c.is_alphabetic()) {
        return Err(PasswordError::NoLetter);
    }

    if policy.require_number && !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::NoNumber);
    }

    Ok(())
}

/// Hash a password using bcrypt after checking it against the default policy
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    validate_password_strength(password, &PasswordPolicy::default())?;

    hash(password, DEFAULT_COST).map_err(|_| PasswordError::HashingFailed)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    verify(password, hash).map_err(|_| PasswordError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_password_policy() {
        let policy = PasswordPolicy::default();

        assert!(validate_password_strength("gymrat2024", &policy).is_ok());
        assert_matches!(
            validate_password_strength("abc1", &policy),
            Err(PasswordError::TooShort(8))
        );
        assert_matches!(
            validate_password_strength(&"a1".repeat(65), &policy),
            Err(PasswordError::TooLong(128))
        );
        assert_matches!(
            validate_password_strength("12345678", &policy),
            Err(PasswordError::NoLetter)
        );
        assert_matches!(
            validate_password_strength("onlyletters", &policy),
            Err(PasswordError::NoNumber)
        );
    }

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("squats4life").unwrap();
        assert_ne!(hashed, "squats4life");
        assert!(verify_password("squats4life", &hashed).unwrap());
        assert!(!verify_password("deadlifts4life", &hashed).unwrap());
    }

    #[test]
    fn test_hash_rejects_weak_password() {
        assert!(hash_password("short").is_err());
    }
}
