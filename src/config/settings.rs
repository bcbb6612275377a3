//! Configuration settings structures for bucket-cache
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;

use redis::{ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo, RedisResult};
use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "bucket-cache".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/bucket-cache.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_redis_host() -> String {
    "127.0.0.1".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_redis_pool_size() -> u32 {
    4
}

fn default_redis_connection_timeout() -> u64 {
    5
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Logger Settings (compatible with LoggerConfig)
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,

    /// File output settings
    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to LoggerConfig
    ///
    /// This method transforms the configuration file representation into
    /// the runtime LoggerConfig used by the logger module.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console_config = self.console.into_console_config();
        let file_config = self.file.into_file_config()?;

        LoggerConfig::new(console_config, file_config, self.level).map_err(|e| {
            ConfigError::ValidationError {
                field: "logger".to_string(),
                message: e.to_string(),
            }
        })
    }
}

impl ConsoleSettings {
    /// Convert ConsoleSettings to ConsoleConfig
    pub fn into_console_config(self) -> ConsoleConfig {
        ConsoleConfig::new(self.enabled, self.colored)
    }
}

impl FileSettings {
    /// Convert FileSettings to FileConfig
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self.parse_format()?;

        FileConfig::new(self.enabled, PathBuf::from(self.path), self.append, format).map_err(
            |e| ConfigError::ValidationError {
                field: "logger.file".to_string(),
                message: e.to_string(),
            },
        )
    }

    /// Parse the format string into LogFormat enum
    fn parse_format(&self) -> Result<LogFormat, ConfigError> {
        self.format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })
    }
}

// ============================================================================
// Cache Configuration
// ============================================================================

/// Cache backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
}

/// How a write into a bucket updates the bucket's own TTL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BucketTtlPolicy {
    /// Reset the bucket TTL to the TTL of the latest write
    #[default]
    LastWrite,
    /// Only ever extend the bucket TTL (requires Redis 7)
    Longest,
}

/// Redis connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis host name or address
    #[serde(default = "default_redis_host")]
    pub host: String,

    /// Redis port
    #[serde(default = "default_redis_port")]
    pub port: u16,

    /// Logical database index
    #[serde(default)]
    pub db: i64,

    /// ACL user name
    #[serde(default)]
    pub username: Option<String>,

    /// Password for AUTH
    #[serde(default)]
    pub password: Option<String>,

    /// Whether to use TLS
    #[serde(default)]
    pub tls_enabled: bool,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_redis_connection_timeout")]
    pub connection_timeout: u64,
}

impl RedisCacheConfig {
    /// Connection parameters for [`redis::Client::open`]
    ///
    /// Credentials are passed as-is rather than through a URL, so they may
    /// contain any character.
    pub fn connection_info(&self) -> RedisResult<ConnectionInfo> {
        let addr = if self.tls_enabled {
            ConnectionAddr::TcpTls {
                host: self.host.clone(),
                port: self.port,
                insecure: false,
                tls_params: None,
            }
        } else {
            ConnectionAddr::Tcp(self.host.clone(), self.port)
        };

        let mut handshake = RedisConnectionInfo::default().set_db(self.db);
        if let Some(username) = &self.username {
            handshake = handshake.set_username(username);
        }
        if let Some(password) = &self.password {
            handshake = handshake.set_password(password);
        }

        Ok(addr.into_connection_info()?.set_redis_settings(handshake))
    }
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            db: 0,
            username: None,
            password: None,
            tls_enabled: false,
            pool_size: default_redis_pool_size(),
            connection_timeout: default_redis_connection_timeout(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cache backend type
    #[serde(default)]
    pub backend: CacheBackend,

    /// Prefix for flat keys and bucket names; empty for none
    #[serde(default)]
    pub key_prefix: String,

    /// Bucket TTL policy
    #[serde(default)]
    pub bucket_ttl_policy: BucketTtlPolicy,

    /// Redis settings
    #[serde(default)]
    pub redis: RedisCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            backend: CacheBackend::default(),
            key_prefix: String::new(),
            bucket_ttl_policy: BucketTtlPolicy::default(),
            redis: RedisCacheConfig::default(),
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Arbitrary implementations for property-based testing
    // ========================================================================

    fn arb_application_config() -> impl Strategy<Value = ApplicationConfig> {
        (
            "[a-z][a-z0-9-]{0,20}",                 // name: valid app name
            "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}", // version: semver-like
        )
            .prop_map(|(name, version)| ApplicationConfig { name, version })
    }

    fn arb_logger_settings() -> impl Strategy<Value = LoggerSettings> {
        (
            prop_oneof![
                Just("trace".to_string()),
                Just("debug".to_string()),
                Just("info".to_string()),
                Just("warn".to_string()),
                Just("error".to_string()),
            ],
            (any::<bool>(), any::<bool>()),
            (
                any::<bool>(),
                prop_oneof![
                    Just("logs/app.log".to_string()),
                    Just("/var/log/bucket-cache.log".to_string()),
                ],
                any::<bool>(),
                prop_oneof![
                    Just("json".to_string()),
                    Just("full".to_string()),
                    Just("compact".to_string()),
                ],
            ),
        )
            .prop_map(
                |(level, (enabled, colored), (file_enabled, path, append, format))| {
                    LoggerSettings {
                        level,
                        console: ConsoleSettings { enabled, colored },
                        file: FileSettings {
                            enabled: file_enabled,
                            path,
                            append,
                            format,
                        },
                    }
                },
            )
    }

    fn arb_redis_config() -> impl Strategy<Value = RedisCacheConfig> {
        (
            prop_oneof![
                Just("127.0.0.1".to_string()),
                Just("redis.internal".to_string()),
                Just("localhost".to_string()),
            ],
            1u16..=65535u16,
            0i64..16i64,
            proptest::option::of("[a-z]{1,12}"),
            proptest::option::of("[a-zA-Z0-9]{8,24}"),
            any::<bool>(),
            1u32..=64u32,
            1u64..=60u64,
        )
            .prop_map(
                |(host, port, db, username, password, tls_enabled, pool_size, connection_timeout)| {
                    RedisCacheConfig {
                        host,
                        port,
                        db,
                        username,
                        password,
                        tls_enabled,
                        pool_size,
                        connection_timeout,
                    }
                },
            )
    }

    fn arb_cache_config() -> impl Strategy<Value = CacheConfig> {
        (
            any::<bool>(),
            prop_oneof![Just(CacheBackend::Redis), Just(CacheBackend::Memory)],
            "[a-z]{0,8}",
            prop_oneof![
                Just(BucketTtlPolicy::LastWrite),
                Just(BucketTtlPolicy::Longest)
            ],
            arb_redis_config(),
        )
            .prop_map(
                |(enabled, backend, key_prefix, bucket_ttl_policy, redis)| CacheConfig {
                    enabled,
                    backend,
                    key_prefix,
                    bucket_ttl_policy,
                    redis,
                },
            )
    }

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (
            arb_application_config(),
            arb_logger_settings(),
            arb_cache_config(),
        )
            .prop_map(|(application, logger, cache)| Settings {
                application,
                logger,
                cache,
            })
    }

    // ========================================================================
    // Property-based tests
    // ========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Serializing any valid Settings to TOML and back yields the same Settings.
        #[test]
        fn prop_settings_round_trip_serialization(settings in arb_settings()) {
            let toml_str = toml::to_string(&settings)
                .expect("Settings should serialize to TOML");

            let deserialized: Settings = toml::from_str(&toml_str)
                .expect("TOML should deserialize back to Settings");

            prop_assert_eq!(settings, deserialized);
        }
    }

    // ========================================================================
    // Unit tests
    // ========================================================================

    #[test]
    fn test_application_config_defaults() {
        let config = ApplicationConfig::default();
        assert_eq!(config.name, "bucket-cache");
        assert_eq!(config.version, crate::pkg_version());
    }

    #[test]
    fn test_cache_config_defaults() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.backend, CacheBackend::Redis);
        assert_eq!(config.key_prefix, "");
        assert_eq!(config.bucket_ttl_policy, BucketTtlPolicy::LastWrite);
    }

    #[test]
    fn test_redis_config_defaults() {
        let config = RedisCacheConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6379);
        assert_eq!(config.db, 0);
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.connection_timeout, 5);
        assert!(!config.tls_enabled);
    }

    #[test]
    fn test_redis_connection_info() {
        let info = RedisCacheConfig::default().connection_info().unwrap();
        assert_eq!(
            info.addr(),
            &ConnectionAddr::Tcp("127.0.0.1".to_string(), 6379)
        );
        assert_eq!(info.redis_settings().db(), 0);
        assert_eq!(info.redis_settings().username(), None);
        assert_eq!(info.redis_settings().password(), None);

        let config = RedisCacheConfig {
            host: "cache.internal".to_string(),
            port: 6380,
            db: 2,
            username: Some("app".to_string()),
            password: Some("secret".to_string()),
            tls_enabled: true,
            ..Default::default()
        };
        let info = config.connection_info().unwrap();
        assert!(matches!(
            info.addr(),
            ConnectionAddr::TcpTls { host, port: 6380, insecure: false, .. } if host == "cache.internal"
        ));
        assert_eq!(info.redis_settings().db(), 2);
        assert_eq!(info.redis_settings().username(), Some("app"));
        assert_eq!(info.redis_settings().password(), Some("secret"));
    }

    #[test]
    fn test_redis_password_with_reserved_characters() {
        let config = RedisCacheConfig {
            db: 3,
            password: Some("p@ss/w#rd:1".to_string()),
            ..Default::default()
        };
        let info = config.connection_info().unwrap();

        assert_eq!(info.redis_settings().password(), Some("p@ss/w#rd:1"));
        assert_eq!(info.redis_settings().db(), 3);
        assert_eq!(
            info.addr(),
            &ConnectionAddr::Tcp("127.0.0.1".to_string(), 6379)
        );
        assert!(redis::Client::open(info).is_ok());
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let toml_str = r#"
[cache]
backend = "memory"
bucket_ttl_policy = "longest"

[cache.redis]
port = 6380
"#;
        let settings: Settings = toml::from_str(toml_str).expect("Failed to deserialize");

        assert!(settings.cache.enabled);
        assert_eq!(settings.cache.backend, CacheBackend::Memory);
        assert_eq!(settings.cache.bucket_ttl_policy, BucketTtlPolicy::Longest);
        assert_eq!(settings.cache.redis.port, 6380);
        assert_eq!(settings.cache.redis.host, "127.0.0.1");
        assert_eq!(settings.logger.level, "info");
    }

    #[test]
    fn test_unknown_ttl_policy_is_rejected() {
        let toml_str = r#"
[cache]
bucket_ttl_policy = "forever"
"#;
        assert!(toml::from_str::<Settings>(toml_str).is_err());
    }

    #[test]
    fn test_logger_settings_into_logger_config() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            console: ConsoleSettings {
                enabled: true,
                colored: false,
            },
            file: FileSettings {
                enabled: true,
                path: "logs/test.log".to_string(),
                append: false,
                format: "compact".to_string(),
            },
        };

        let config = settings.into_logger_config().expect("Should convert");
        assert_eq!(config.level, "debug");
        assert!(!config.console.colored);
        assert!(config.file.enabled);
        assert_eq!(config.file.path, PathBuf::from("logs/test.log"));
        assert_eq!(config.file.format, LogFormat::Compact);
    }

    #[test]
    fn test_file_settings_into_file_config_invalid_format() {
        let settings = FileSettings {
            format: "xml".to_string(),
            ..Default::default()
        };
        let err = settings.into_file_config().unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { field, .. } if field == "logger.file.format")
        );
    }

    #[test]
    fn test_logger_settings_into_logger_config_both_disabled() {
        let settings = LoggerSettings {
            console: ConsoleSettings {
                enabled: false,
                colored: false,
            },
            ..Default::default()
        };
        assert!(settings.into_logger_config().is_err());
    }
}
