//! Configuration Error Types
//!
//! Errors raised while loading or validating hook chain configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// An explicitly requested configuration file does not exist
    #[error("Configuration file not found: {path}")]
    ConfigFileNotFound { path: PathBuf },

    /// The layered sources could not be read or merged
    #[error("Failed to load configuration from {source_name}: {error}")]
    LoadError { source_name: String, error: String },

    /// The merged configuration does not match the expected shape
    #[error("Invalid configuration structure: {error}")]
    DeserializationError { error: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },
}

impl ConfigurationError {
    /// Create a load error
    pub fn load_error<S: Into<String>, E: std::fmt::Display>(source_name: S, error: E) -> Self {
        Self::LoadError {
            source_name: source_name.into(),
            error: error.to_string(),
        }
    }

    /// Create a deserialization error
    pub fn deserialization_error<E: std::fmt::Display>(error: E) -> Self {
        Self::DeserializationError {
            error: error.to_string(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value<F: Into<String>, V: Into<String>, C: Into<String>>(
        field: F,
        value: V,
        context: C,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigurationError>;
