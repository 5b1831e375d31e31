use validator::ValidateEmail;

use crate::error::ApiError;

/// Shortest link token accepted before hashing. Issued tokens are 43 chars.
pub const MIN_PRESENTED_TOKEN_LEN: usize = 32;

/// Longest link token accepted before hashing
pub const MAX_PRESENTED_TOKEN_LEN: usize = 256;

/// Guard run before `evt_token::verify_token`, which accepts the empty string.
pub const fn is_plausible_token(token: &str) -> bool {
    token.len() >= MIN_PRESENTED_TOKEN_LEN && token.len() <= MAX_PRESENTED_TOKEN_LEN
}

/// Validate email format using the validator crate
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::Validation("Email cannot be empty".to_string()));
    }

    if email.len() > 320 || !email.validate_email() {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validate a guest display name
pub fn validate_guest_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("Guest name cannot be empty".to_string()));
    }

    if name.chars().count() > 100 {
        return Err(ApiError::Validation(
            "Guest name must be at most 100 characters long".to_string(),
        ));
    }

    if name.chars().any(|c| c.is_control() || c == '<' || c == '>') {
        return Err(ApiError::Validation(
            "Guest name contains invalid characters".to_string(),
        ));
    }

    Ok(())
}

/// Check the length of a free-text field, counted in characters
pub fn validate_text_len(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ApiError> {
    let len = value.chars().count();

    if len < min {
        return Err(ApiError::Validation(if min == 1 {
            format!("{field} cannot be empty")
        } else {
            format!("{field} must be at least {min} characters long")
        }));
    }

    if len > max {
        return Err(ApiError::Validation(format!(
            "{field} must be at most {max} characters long"
        )));
    }

    Ok(())
}
