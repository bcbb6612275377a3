//! CLI argument parsing with clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use super::validation::{
    validate_config_file_path, validate_host_address, validate_port, validate_ttl,
};

/// Inspect and maintain cache entries
#[derive(Parser, Debug)]
#[command(name = "bucket-cache")]
#[command(about = "Inspect and maintain flat and bucketed cache entries")]
#[command(long_about = "
bucket-cache reads and writes the entries of a cache-aside layer kept in Redis.
Flat entries live under their own key. Bucketed entries are members of a named
bucket and expire individually even though the store only expires whole buckets.

EXAMPLES:
    # Read a flat entry
    bucket-cache get user:42

    # Store a member of the 'orders' bucket for 5 seconds
    bucket-cache put o1 '{\"status\":\"open\"}' --ttl 5 --bucket orders

    # Drop every member of a bucket
    bucket-cache invalidate-all --bucket orders

    # Validate configuration and ping the store
    bucket-cache --config /etc/bucket-cache/production.toml check
")]
#[command(version = crate::build::CLAP_LONG_VERSION)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Load this TOML file instead of the layered configuration directory.
    /// Environment variable overrides still apply.
    #[arg(short, long, global = true, value_name = "FILE", value_parser = validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects the `{environment}.toml` overlay; defaults to BUCKET_CACHE_APP_ENV.
    #[arg(short, long, global = true, value_enum)]
    pub env: Option<Environment>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Redis host, overriding cache.redis.host
    #[arg(long, global = true, value_name = "HOST", value_parser = validate_host_address)]
    pub redis_host: Option<String>,

    /// Redis port, overriding cache.redis.port
    #[arg(long, global = true, value_name = "PORT", value_parser = validate_port)]
    pub redis_port: Option<u16>,

    /// Key prefix, overriding cache.key_prefix
    #[arg(long, global = true, value_name = "PREFIX")]
    pub key_prefix: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print a live entry, or `(nil)` when absent or expired
    Get {
        key: String,

        /// Read a member of this bucket instead of a flat key
        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// Store an entry
    Put {
        key: String,

        /// Raw payload, stored verbatim
        value: String,

        /// Time to live in seconds
        #[arg(short, long, value_name = "SECONDS", value_parser = validate_ttl)]
        ttl: u64,

        /// Store as a member of this bucket
        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// Remove one entry
    Invalidate {
        key: String,

        #[arg(short, long)]
        bucket: Option<String>,
    },
    /// Remove a whole bucket
    InvalidateAll {
        #[arg(short, long)]
        bucket: String,
    },
    /// Validate configuration and ping the store
    Check,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
