//! Input rules shared by the services. Every failure is a
//! [`DomainError::Validation`] carrying a client-facing message.

use std::collections::HashSet;
use std::hash::Hash;

use domains::errors::{DomainError, Result};
use domains::models::{MAX_SCORE, MIN_SCORE};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
pub const PASSWORD_MIN: usize = 8;
pub const SLOGAN_MAX: usize = 160;
pub const REVIEW_MAX: usize = 10_000;
pub const LIST_NAME_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 2_000;

pub fn username(raw: &str) -> Result<String> {
    let name = raw.trim();
    let len = name.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(DomainError::validation(format!(
            "username must be between {USERNAME_MIN} and {USERNAME_MAX} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(DomainError::validation(
            "username may only contain letters, digits, '_', '.' and '-'",
        ));
    }
    Ok(name.to_owned())
}

/// Trims and lowercases; only checks the overall `local@domain` shape.
pub fn email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(DomainError::validation("email address is invalid")),
    }
}

pub fn password(raw: &str) -> Result<()> {
    if raw.chars().count() < PASSWORD_MIN {
        return Err(DomainError::validation(format!(
            "password must be at least {PASSWORD_MIN} characters"
        )));
    }
    Ok(())
}

/// Bounds are inclusive; half-point granularity is not enforced.
pub fn score(score: f64) -> Result<f64> {
    if score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score) {
        Ok(score)
    } else {
        Err(DomainError::validation(format!(
            "score must be between {MIN_SCORE} and {MAX_SCORE}"
        )))
    }
}

/// Non-empty after trimming, at most `max` characters.
pub fn required_text(field: &str, raw: &str, max: usize) -> Result<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DomainError::validation(format!("{field} must not be empty")));
    }
    if text.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(text.to_owned())
}

/// Blank input becomes `None`.
pub fn optional_text(field: &str, raw: Option<&str>, max: usize) -> Result<Option<String>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) if text.chars().count() > max => Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        ))),
        Some(text) => Ok(Some(text.to_owned())),
    }
}

pub fn positive_id(field: &str, id: i64) -> Result<i64> {
    if id > 0 {
        Ok(id)
    } else {
        Err(DomainError::validation(format!("{field} must be a positive integer")))
    }
}

pub fn no_duplicates<T: Eq + Hash>(field: &str, values: impl IntoIterator<Item = T>) -> Result<()> {
    let mut seen = HashSet::new();
    if values.into_iter().all(|value| seen.insert(value)) {
        Ok(())
    } else {
        Err(DomainError::validation(format!("{field} contains duplicate entries")))
    }
}
