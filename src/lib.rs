//! Cache-aside helpers over Redis with per-member expiry inside buckets.
//!
//! See [`cache`] for the caching API, [`config`] for settings and
//! [`logger`] for tracing setup.

use shadow_rs::shadow;
shadow!(build);

pub mod cache;
pub mod cli;
pub mod config;
pub mod logger;

pub use cache::{BucketCache, CacheError, CacheManager, CacheStore, FlatCache};
pub use config::Settings;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
