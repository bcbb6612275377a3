//! Settings for the cache, the logger and the application itself.
//!
//! Precedence, highest first:
//! 1. `BUCKET_CACHE_*` environment variables (`BUCKET_CACHE_CACHE__REDIS__HOST`)
//! 2. `local.toml`
//! 3. `{environment}.toml`, environment taken from `BUCKET_CACHE_APP_ENV`
//! 4. `default.toml`
//!
//! Command-line flags are merged on top by the CLI.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
mod validation;

pub use environment::Environment;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, BucketTtlPolicy, CacheBackend, CacheConfig, ConsoleSettings, FileSettings,
    LoggerSettings, RedisCacheConfig, Settings,
};

/// Serializes tests that touch process environment variables
#[cfg(test)]
pub(crate) fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
