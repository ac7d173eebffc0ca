// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Field validation rules.
//!
//! Pure predicates evaluated before anything is persisted. Each returns the
//! validated value or a typed [`ValidationError`]; the first violation wins.

use thiserror::Error;

/// Minimum username length
pub const MIN_USERNAME_LENGTH: usize = 3;
/// Minimum instructions length
pub const MIN_INSTRUCTIONS_LENGTH: usize = 50;

/// Possible validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Username must be at least 3 characters long.")]
    UsernameTooShort,

    #[error("{0} is required.")]
    Required(&'static str),

    #[error("Instructions must be at least 50 characters long.")]
    InstructionsTooShort,

    #[error("Minutes to complete must be a positive number.")]
    MinutesNotPositive,
}

impl ValidationError {
    /// Name of the offending field, for structured logs
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::UsernameTooShort => "username",
            ValidationError::Required(field) => field,
            ValidationError::InstructionsTooShort => "instructions",
            ValidationError::MinutesNotPositive => "minutes_to_complete",
        }
    }
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a username: required, non-empty, at least 3 characters
pub fn validate_username(username: &str) -> ValidationResult<&str> {
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }
    Ok(username)
}

/// Validate a recipe title: required, non-empty
pub fn validate_title(title: &str) -> ValidationResult<&str> {
    if title.is_empty() {
        return Err(ValidationError::Required("title"));
    }
    Ok(title)
}

/// Validate recipe instructions: required, at least 50 characters
pub fn validate_instructions(instructions: &str) -> ValidationResult<&str> {
    if instructions.is_empty() {
        return Err(ValidationError::Required("instructions"));
    }
    if instructions.chars().count() < MIN_INSTRUCTIONS_LENGTH {
        return Err(ValidationError::InstructionsTooShort);
    }
    Ok(instructions)
}

/// Validate minutes to complete: must be a positive integer
pub fn validate_minutes(minutes: i64) -> ValidationResult<i64> {
    if minutes <= 0 {
        return Err(ValidationError::MinutesNotPositive);
    }
    Ok(minutes)
}
