//! Field checks shared by request types that the `validator` derive does not cover.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::AppError;

static USERNAME_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static PHONE_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn matches(cell: &OnceLock<Option<Regex>>, pattern: &str, value: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|regex| regex.is_match(value))
}

/// Letters, digits and `@ . + - _` only
pub fn validate_username(username: &str) -> Result<(), String> {
    if matches(&USERNAME_PATTERN, r"^[A-Za-z0-9@.+_-]+$", username) {
        Ok(())
    } else {
        Err("Username may contain only letters, digits and @/./+/-/_".to_string())
    }
}

pub fn validate_phone(phone: &str) -> Result<(), String> {
    if matches(&PHONE_PATTERN, r"^\+?[0-9 ()-]{6,20}$", phone.trim()) {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid phone number", phone))
    }
}

/// Trim a required text field and reject it when blank
pub fn require_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Normalise an optional filter: trimmed, `None` when blank
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// `ILIKE ... ESCAPE '\'` pattern matching `value` anywhere, with the
/// user's own wildcards taken literally
pub fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usernames() {
        assert!(validate_username("maria.k+gym@home_1-2").is_ok());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
    }

    #[test]
    fn test_phones() {
        assert!(validate_phone("+1 (555) 123-4567").is_ok());
        assert!(validate_phone("9876543210").is_ok());
        assert!(validate_phone("call me").is_err());
        assert!(validate_phone("12").is_err());
    }

    #[test]
    fn test_require_text_and_non_blank() {
        assert_eq!(require_text("name", "  Iron Temple ").unwrap(), "Iron Temple");
        assert!(require_text("name", "   ").is_err());
        assert_eq!(non_blank(Some("  Pune ")), Some("Pune".to_string()));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Pune"), "%Pune%");
        assert_eq!(contains_pattern("_"), "%\\_%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern(r"a\b"), r"%a\\b%");
    }
}
