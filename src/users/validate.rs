use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 100;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Blank strings count as missing.
pub fn required(value: Option<String>, field: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

/// Partial-update field: absent or blank keeps the stored value.
pub fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub fn name(raw: String) -> Result<String, ApiError> {
    let name = raw.trim().to_string();
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ApiError::BadRequest(format!(
            "name must be at most {NAME_MAX_LEN} characters"
        )));
    }
    Ok(name)
}

pub fn email(raw: &str) -> Result<String, ApiError> {
    let email = normalize_email(raw);
    if !is_valid_email(&email) {
        return Err(ApiError::BadRequest("Invalid email".into()));
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        return Err(ApiError::BadRequest(format!(
            "email must be at most {EMAIL_MAX_LEN} characters"
        )));
    }
    Ok(email)
}
