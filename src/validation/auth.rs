use garde::Validate;

use crate::error::{AppError, Result};

/// Runs the `garde` rules declared on a request body.
pub fn validate_body<T>(body: &T) -> Result<()>
where
    T: Validate,
    T::Context: Default,
{
    body.validate()
        .map_err(|report| AppError::Validation(report.to_string()))
}

/// Normalizes an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates a seller's display name.
///
/// # Arguments
///
/// * `name` - The name to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the name is valid.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation("Name cannot be empty".to_string()));
    }

    if name.chars().any(char::is_control) {
        return Err(AppError::Validation(
            "Name cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}
