// ABOUTME: Opt-in write-time checks for system settings
// ABOUTME: Key naming rules and value/type conformance reporting

use sysconf_storage::StorageError;
use thiserror::Error;

use crate::typed::strip_digit_separators;
use crate::types::ValueType;

/// Longest key accepted by [`validate_key`]
pub const MAX_KEY_LENGTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Setting key cannot be empty")]
    EmptyKey,

    #[error("Setting key is {0} characters long. Must be at most {max}", max = MAX_KEY_LENGTH)]
    KeyTooLong(usize),

    #[error("Invalid character {1:?} in setting key: {0}. Use letters, digits, '_', '.' or '-'")]
    InvalidKeyCharacter(String, char),

    #[error("Invalid integer value: {0}")]
    InvalidInteger(String),

    #[error("Invalid float value: {0}")]
    InvalidFloat(String),

    #[error("Unrecognized boolean value: {0}. It will read as false; use true/false, 1/0 or yes/no")]
    AmbiguousBoolean(String),
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::InvalidInput(err.to_string())
    }
}

/// Check that a key is non-empty, bounded, and made of safe characters
pub fn validate_key(key: &str) -> Result<(), ValidationError> {
    if key.trim().is_empty() {
        return Err(ValidationError::EmptyKey);
    }

    let length = key.chars().count();
    if length > MAX_KEY_LENGTH {
        return Err(ValidationError::KeyTooLong(length));
    }

    if let Some(bad) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')))
    {
        return Err(ValidationError::InvalidKeyCharacter(key.to_string(), bad));
    }

    Ok(())
}

/// Report whether `value` would decode cleanly as `value_type`.
///
/// Storage never calls this; reads decode lazily. Booleans are flagged when
/// they are not a recognizable literal because they would silently read as false.
pub fn validate_value(value: &str, value_type: &ValueType) -> Result<(), ValidationError> {
    match value_type {
        ValueType::Int => {
            strip_digit_separators(value.trim())
                .parse::<i64>()
                .map_err(|_| ValidationError::InvalidInteger(value.to_string()))?;
        }
        ValueType::Float => {
            strip_digit_separators(value.trim())
                .parse::<f64>()
                .map_err(|_| ValidationError::InvalidFloat(value.to_string()))?;
        }
        ValueType::Bool => match value.to_lowercase().as_str() {
            "true" | "1" | "yes" | "false" | "0" | "no" => {}
            _ => return Err(ValidationError::AmbiguousBoolean(value.to_string())),
        },
        ValueType::String => {}
    }

    Ok(())
}
