//! Configuration error types

use std::path::Path;

use thiserror::Error;

/// Errors raised while locating, parsing or validating settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested file or directory does not exist
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// The layered sources could not be deserialized into [`Settings`](super::Settings)
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A loaded value is outside its accepted range
    #[error("Validation error: {field} - {message}")]
    ValidationError {
        /// Dotted path of the offending setting, e.g. `cache.redis.port`
        field: String,
        message: String,
    },

    #[error("Environment variable error: {0}")]
    EnvVarError(String),

    /// Both the config directory and the config file override were given
    #[error("Mutual exclusivity error: {0}")]
    MutualExclusivityError(String),

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found(path: &Path) -> Self {
        ConfigError::FileNotFound(path.display().to_string())
    }

    pub fn mutual_exclusivity<S: Into<String>>(message: S) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }

    /// Name of the setting that failed validation, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validation_error_display() {
        let err = ConfigError::validation("cache.redis.port", "must not be zero");
        assert_eq!(
            err.to_string(),
            "Validation error: cache.redis.port - must not be zero"
        );
        assert_eq!(err.field(), Some("cache.redis.port"));
    }

    #[test]
    fn test_file_not_found_keeps_path() {
        let err = ConfigError::file_not_found(&PathBuf::from("/etc/bucket-cache/app.toml"));
        assert!(err.to_string().contains("/etc/bucket-cache/app.toml"));
        assert_eq!(err.field(), None);
    }
}
