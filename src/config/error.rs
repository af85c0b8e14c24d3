//! Configuration Error Types
//!
//! Errors raised while loading or validating the process configuration. These
//! are startup-fatal; missing connection credentials are deliberately NOT
//! represented here (see [`crate::error::ConnectError::Configuration`]).

use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A source could not be read or a value could not be deserialized
    #[error("Failed to load configuration: {error}")]
    LoadError { error: String },

    /// A value was present but unusable. Never carries the value itself.
    #[error("Invalid value for field '{field}': {context}")]
    InvalidValue { field: String, context: String },
}

impl ConfigurationError {
    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            context: context.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        Self::LoadError {
            error: err.to_string(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;
