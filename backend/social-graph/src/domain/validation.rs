//! Input validation run before any store write

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ServiceError, ServiceResult};

// Dotted or quoted local part; domain is dotted labels with a 2+ letter TLD
// or a bracketed IPv4 literal. Matched against the lowercased address.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-z\-0-9]+\.)+[a-z]{2,}))$"#,
    )
    .expect("hardcoded email regex is invalid - fix source code")
});

/// Email syntax check
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(&email.to_lowercase())
}

pub fn validate_email(email: &str) -> ServiceResult<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "email format not valid: {email}"
        )))
    }
}

/// Required string fields must carry something other than whitespace
pub fn require_non_blank(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        Err(ServiceError::Validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

/// Like [`require_non_blank`] but for optional update inputs: absent passes,
/// present-but-blank fails.
pub fn require_non_blank_if_present(field: &str, value: Option<&str>) -> ServiceResult<()> {
    match value {
        Some(value) => require_non_blank(field, value),
        None => Ok(()),
    }
}
