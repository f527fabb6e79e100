//! Error types shared across the stylus stack.

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced by the core data model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A configuration value is missing or outside its valid domain.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// A value object was constructed with inconsistent fields.
    #[error("validation error: {message}")]
    Validation {
        /// What validation failed.
        message: String,
    },
}

impl CoreError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_config("screen size is zero");
        assert_eq!(err.to_string(), "invalid config: screen size is zero");
    }
}
