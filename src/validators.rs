/// Input validators module
///
/// Everything here runs before a request reaches the service layer:
/// 1. DoS protection: input length limits
/// 2. Format validation: email shape, control characters
/// 3. Request shape rules: the username-XOR-email identifier, non-empty
///    updates
///
/// Passwords deliberately carry no strength policy and are never trimmed;
/// any non-empty secret within the length limit is accepted byte-for-byte.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;
use crate::store::UserFilter;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MAX_USERNAME_LENGTH: usize = 64;
const MAX_NAME_LENGTH: usize = 50; // matches the column width
const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Validates an email address
/// - Checks format using RFC 5322 simplified regex
/// - Verifies length constraints
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(trimmed.to_string())
}

/// Validates a username
/// - Verifies length constraints
/// - Rejects control characters
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username"));
    }

    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username", MAX_USERNAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidFormat("username"));
    }

    Ok(trimmed.to_string())
}

/// Validates an optional profile name (first or last)
pub fn is_valid_name(field: &'static str, name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }

    if trimmed.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong(field, MAX_NAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::InvalidFormat(field));
    }

    Ok(trimmed.to_string())
}

/// Validates a password without altering it
///
/// No trimming and no strength rules: the secret is the caller's exact
/// bytes, bounded only to keep hashing cost sane.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password", MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Resolves the login identifier rule: exactly one of username or email
/// must be present, and the one given must be valid.
pub fn login_identifier(
    username: Option<&str>,
    email: Option<&str>,
) -> Result<UserFilter, ValidationError> {
    match (username, email) {
        (Some(username), None) => Ok(UserFilter::Username(is_valid_username(username)?)),
        (None, Some(email)) => Ok(UserFilter::Email(is_valid_email(email)?)),
        _ => Err(ValidationError::AmbiguousIdentifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
        assert!(is_valid_email("a@x.com").is_ok());
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
    }

    #[test]
    fn test_email_is_trimmed() {
        assert_eq!(
            is_valid_email("  user@example.com  ").unwrap(),
            "user@example.com"
        );
    }

    #[test]
    fn test_email_length_limit() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());
    }

    #[test]
    fn test_valid_username() {
        assert!(is_valid_username("johndoe").is_ok());
        assert!(is_valid_username("john_doe-99").is_ok());
    }

    #[test]
    fn test_username_limits() {
        assert!(is_valid_username("").is_err());
        assert!(is_valid_username("   ").is_err());
        assert!(is_valid_username(&"a".repeat(65)).is_err());
        assert!(is_valid_username("john\0doe").is_err());
    }

    #[test]
    fn test_valid_name() {
        assert!(is_valid_name("first_name", "John").is_ok());
        assert!(is_valid_name("first_name", "Jean-Pierre").is_ok());
        assert!(is_valid_name("last_name", "O'Brien").is_ok());
    }

    #[test]
    fn test_name_limits() {
        assert!(is_valid_name("first_name", "").is_err());
        assert!(is_valid_name("first_name", &"a".repeat(51)).is_err());
        assert!(is_valid_name("first_name", "John\0").is_err());
    }

    #[test]
    fn test_short_passwords_are_accepted() {
        // No strength policy: short secrets are the caller's business.
        assert!(is_valid_password("pw1").is_ok());
        assert!(is_valid_password("x").is_ok());
    }

    #[test]
    fn test_password_limits() {
        assert!(is_valid_password("").is_err());
        assert!(is_valid_password(&"a".repeat(129)).is_err());
        assert!(is_valid_password(&"a".repeat(128)).is_ok());
    }

    #[test]
    fn test_password_is_not_trimmed() {
        // Leading and trailing whitespace is part of the secret.
        assert!(is_valid_password("  spaced  ").is_ok());
    }

    #[test]
    fn test_identifier_requires_exactly_one() {
        assert!(login_identifier(Some("johndoe"), None).is_ok());
        assert!(login_identifier(None, Some("john@example.com")).is_ok());
        assert!(login_identifier(None, None).is_err());
        assert!(login_identifier(Some("johndoe"), Some("john@example.com")).is_err());
    }

    #[test]
    fn test_identifier_resolves_to_the_right_filter() {
        match login_identifier(Some("johndoe"), None).unwrap() {
            UserFilter::Username(username) => assert_eq!(username, "johndoe"),
            other => panic!("expected username filter, got {:?}", other),
        }

        match login_identifier(None, Some("john@example.com")).unwrap() {
            UserFilter::Email(email) => assert_eq!(email, "john@example.com"),
            other => panic!("expected email filter, got {:?}", other),
        }
    }

    #[test]
    fn test_identifier_validates_its_field() {
        assert!(login_identifier(None, Some("not-an-email")).is_err());
        assert!(login_identifier(Some(""), None).is_err());
    }
}
