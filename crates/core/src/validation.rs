//! Registration and workout input validation.
//!
//! These checks run before anything reaches the database. Uniqueness of
//! usernames is not checked here; the `users.username` constraint owns it.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum username length in characters.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Special characters of which a password must contain at least one.
pub const PASSWORD_SPECIAL_CHARS: &str = "@$!%*?&";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}(?:\.[a-zA-Z]{2,})?$")
        .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Username must be present and at most [`MAX_USERNAME_LENGTH`] characters.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    if username.is_empty() {
        return Err(CoreError::Validation("username is required".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "username cannot be greater than {MAX_USERNAME_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !EMAIL_RE.is_match(email) {
        return Err(CoreError::Validation("invalid email format".to_string()));
    }
    Ok(())
}

/// Password complexity: minimum length plus one lowercase letter, one
/// uppercase letter, one digit and one of [`PASSWORD_SPECIAL_CHARS`].
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    let rules: [(fn(char) -> bool, &str); 4] = [
        (|c| c.is_ascii_lowercase(), "one lowercase letter"),
        (|c| c.is_ascii_uppercase(), "one uppercase letter"),
        (|c| c.is_ascii_digit(), "one number"),
        (|c| PASSWORD_SPECIAL_CHARS.contains(c), "one special character"),
    ];
    for (check, requirement) in rules {
        if !password.chars().any(check) {
            return Err(CoreError::Validation(format!(
                "password must include at least {requirement}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Workouts
// ---------------------------------------------------------------------------

/// Every entry needs at least one set, and `order_index` values must not
/// repeat within one workout.
pub fn validate_entries<I>(entries: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = (i32, i32)>,
{
    let mut seen = std::collections::HashSet::new();
    for (sets, order_index) in entries {
        if sets < 1 {
            return Err(CoreError::Validation(
                "every entry must have at least one set".to_string(),
            ));
        }
        if !seen.insert(order_index) {
            return Err(CoreError::Validation(format!(
                "duplicate order_index {order_index} in workout entries"
            )));
        }
    }
    Ok(())
}
