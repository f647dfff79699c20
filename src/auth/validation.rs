//! Client-side input validation for sign-up, login and posting.
//!
//! Each check runs before any request is sent and fails with
//! [`ApiError::Validation`] naming the offending field.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ApiError, ApiResult};

lazy_static! {
    /// Login ids: 4-20 ASCII letters, digits or underscores
    static ref LOGIN_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_]{4,20}$").unwrap();

    /// Deliberately loose: something@something.tld
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[A-Za-z]{2,}$").unwrap();

    static ref VERIFY_CODE_REGEX: Regex = Regex::new(r"^[0-9A-Za-z]{4,8}$").unwrap();
}

pub fn validate_login_id(login_id: &str) -> ApiResult<()> {
    if login_id.is_empty() {
        return Err(ApiError::validation("loginId", "Login ID is required"));
    }
    if !LOGIN_ID_REGEX.is_match(login_id) {
        return Err(ApiError::validation(
            "loginId",
            "Login ID must be 4-20 letters, digits or underscores",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ApiResult<()> {
    let len = password.chars().count();
    if len < 8 {
        return Err(ApiError::validation(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if len > 64 {
        return Err(ApiError::validation(
            "password",
            "Password is too long (max 64 characters)",
        ));
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(ApiError::validation(
            "password",
            "Password must contain at least one letter and one digit",
        ));
    }
    Ok(())
}

pub fn validate_nickname(nickname: &str) -> ApiResult<()> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("nickname", "Nickname is required"));
    }
    let len = trimmed.chars().count();
    if !(2..=16).contains(&len) {
        return Err(ApiError::validation(
            "nickname",
            "Nickname must be 2-16 characters",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> ApiResult<()> {
    if email.is_empty() {
        return Err(ApiError::validation("email", "Email is required"));
    }
    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err(ApiError::validation("email", "Invalid email format"));
    }
    Ok(())
}

pub fn validate_verify_code(code: &str) -> ApiResult<()> {
    if !VERIFY_CODE_REGEX.is_match(code) {
        return Err(ApiError::validation("code", "Invalid verification code"));
    }
    Ok(())
}

/// Title and body of a post; both required
pub fn validate_post(title: &str, content: &str) -> ApiResult<()> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("title", "Title is required"));
    }
    if title.chars().count() > 200 {
        return Err(ApiError::validation(
            "title",
            "Title is too long (max 200 characters)",
        ));
    }
    if content.trim().is_empty() {
        return Err(ApiError::validation("content", "Content is required"));
    }
    Ok(())
}

pub fn validate_comment(content: &str) -> ApiResult<()> {
    if content.trim().is_empty() {
        return Err(ApiError::validation("content", "Comment cannot be empty"));
    }
    Ok(())
}
