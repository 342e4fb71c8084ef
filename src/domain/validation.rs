//! Field rules shared by every service. Each check returns the message that
//! ends up in the 400 response body.

use regex::Regex;
use std::sync::OnceLock;

use crate::constants::{catalog, reviews, users};

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn username_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^[\w.@+-]+$")
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
}

fn slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    get_regex(&RE, r"^[-a-zA-Z0-9_]+$")
}

pub fn username(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("username is required".to_string());
    }
    if value.chars().count() > users::USERNAME_MAX_LEN {
        return Err(format!(
            "username must be at most {} characters",
            users::USERNAME_MAX_LEN
        ));
    }
    if !username_re().is_match(value) {
        return Err(
            "username may contain only letters, digits and the characters . @ + - _".to_string(),
        );
    }
    if users::RESERVED_USERNAMES.contains(&value) {
        return Err(format!("username '{value}' is reserved"));
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("email is required".to_string());
    }
    if value.chars().count() > users::EMAIL_MAX_LEN {
        return Err(format!(
            "email must be at most {} characters",
            users::EMAIL_MAX_LEN
        ));
    }
    if !email_re().is_match(value) {
        return Err("email is not a valid address".to_string());
    }
    Ok(())
}

pub fn person_name(field: &str, value: &str) -> Result<(), String> {
    if value.chars().count() > users::NAME_MAX_LEN {
        return Err(format!(
            "{field} must be at most {} characters",
            users::NAME_MAX_LEN
        ));
    }
    Ok(())
}

pub fn catalog_name(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("name is required".to_string());
    }
    if value.chars().count() > catalog::NAME_MAX_LEN {
        return Err(format!(
            "name must be at most {} characters",
            catalog::NAME_MAX_LEN
        ));
    }
    Ok(())
}

pub fn slug(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("slug is required".to_string());
    }
    if value.len() > catalog::SLUG_MAX_LEN {
        return Err(format!(
            "slug must be at most {} characters",
            catalog::SLUG_MAX_LEN
        ));
    }
    if !slug_re().is_match(value) {
        return Err("slug may contain only letters, digits, hyphens and underscores".to_string());
    }
    Ok(())
}

/// A release year can't be in the future.
pub fn year(value: i32, current_year: i32) -> Result<(), String> {
    if !(0..=current_year).contains(&value) {
        return Err(format!("year must be between 0 and {current_year}"));
    }
    Ok(())
}

pub fn score(value: i32) -> Result<(), String> {
    if !(reviews::MIN_SCORE..=reviews::MAX_SCORE).contains(&value) {
        return Err(format!(
            "score must be between {} and {}",
            reviews::MIN_SCORE,
            reviews::MAX_SCORE
        ));
    }
    Ok(())
}

pub fn text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username() {
        assert!(username("alice").is_ok());
        assert!(username("a.b@c+d-e_f").is_ok());
        assert!(username("юзер").is_ok());
        assert!(username("").is_err());
        assert!(username("has space").is_err());
        assert!(username("semi;colon").is_err());
        assert!(username(&"a".repeat(151)).is_err());
        assert!(username(&"a".repeat(150)).is_ok());
    }

    #[test]
    fn test_reserved_username() {
        let err = username("me").unwrap_err();
        assert!(err.contains("reserved"));
        assert!(username("me2").is_ok());
    }

    #[test]
    fn test_email() {
        assert!(email("alice@example.com").is_ok());
        assert!(email("").is_err());
        assert!(email("alice").is_err());
        assert!(email("alice@example").is_err());
        assert!(email("a b@example.com").is_err());
    }

    #[test]
    fn test_slug() {
        assert!(slug("sci-fi_2").is_ok());
        assert!(slug("").is_err());
        assert!(slug("no spaces").is_err());
        assert!(slug("кино").is_err());
        assert!(slug(&"s".repeat(51)).is_err());
    }

    #[test]
    fn test_year() {
        assert!(year(0, 2026).is_ok());
        assert!(year(2026, 2026).is_ok());
        assert!(year(2027, 2026).is_err());
        assert!(year(-1, 2026).is_err());
    }

    #[test]
    fn test_score_bounds() {
        assert!(score(0).is_err());
        assert!(score(1).is_ok());
        assert!(score(10).is_ok());
        assert!(score(11).is_err());
    }

    #[test]
    fn test_text_rejects_blank() {
        assert!(text("text", "   ").is_err());
        assert!(text("text", "fine").is_ok());
    }
}
