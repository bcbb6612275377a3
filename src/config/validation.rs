//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    CacheBackend, CacheConfig, FileSettings, LoggerSettings, RedisCacheConfig, Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl RedisCacheConfig {
    /// Validate Redis connection configuration
    ///
    /// # Validation Rules
    /// - Host must not be empty or contain whitespace
    /// - Port must be between 1 and 65535
    /// - Database index must not be negative
    /// - Pool size and connection timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(ConfigError::validation(
                "cache.redis.host",
                "Redis host is required. Please specify a host name or address.",
            ));
        }

        if host.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError {
                field: "cache.redis.host".to_string(),
                message: format!("Redis host '{}' cannot contain whitespace.", self.host),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::validation(
                "cache.redis.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.db < 0 {
            return Err(ConfigError::ValidationError {
                field: "cache.redis.db".to_string(),
                message: format!("Database index ({}) cannot be negative.", self.db),
            });
        }

        if self.pool_size == 0 {
            return Err(ConfigError::validation(
                "cache.redis.pool_size",
                "Pool size must be greater than 0.",
            ));
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "cache.redis.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl CacheConfig {
    /// Validate cache configuration
    ///
    /// # Validation Rules
    /// - Key prefix must not contain whitespace or end with ':'
    /// - Redis settings are checked only when the Redis backend is in use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::ValidationError {
                field: "cache.key_prefix".to_string(),
                message: format!("Key prefix '{}' cannot contain whitespace.", self.key_prefix),
            });
        }

        if self.key_prefix.ends_with(':') {
            return Err(ConfigError::ValidationError {
                field: "cache.key_prefix".to_string(),
                message: format!(
                    "Key prefix '{}' must not end with ':'; the separator is added automatically.",
                    self.key_prefix
                ),
            });
        }

        if self.enabled && self.backend == CacheBackend::Redis {
            self.redis.validate()?;
        }

        Ok(())
    }
}

impl FileSettings {
    /// Validate file settings
    fn validate(&self) -> Result<(), ConfigError> {
        // If file logging is enabled, path must not be empty
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    /// - At least one of console or file output must be enabled
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        if !self.console.enabled && !self.file.enabled {
            return Err(ConfigError::validation(
                "logger",
                "At least one output (console or file) must be enabled.",
            ));
        }

        self.file.validate()?;

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logger.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}
