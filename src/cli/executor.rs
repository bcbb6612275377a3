//! Command dispatch

use anyhow::Context;

use super::parser::{Cli, Commands};
use crate::cache::CacheManager;
use crate::config::Settings;

/// Printed for a missing or expired entry
const NIL: &str = "(nil)";

/// Connect to the configured store, run the command and print its result
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    let manager = CacheManager::new(settings.cache)
        .await
        .context("Failed to set up the cache store")?;

    let output = run(&cli.command, &manager).await?;
    println!("{output}");

    Ok(())
}

/// Run one command against `manager` and return the text to print
pub(crate) async fn run(command: &Commands, manager: &CacheManager) -> anyhow::Result<String> {
    match command {
        Commands::Get { key, bucket } => {
            let value = match bucket {
                Some(bucket) => manager.for_bucket(bucket).get(key).await,
                None => manager.get(key).await,
            }
            .with_context(|| format!("Failed to read '{key}'"))?;

            Ok(value.unwrap_or_else(|| NIL.to_string()))
        }
        Commands::Put {
            key,
            value,
            ttl,
            bucket,
        } => {
            let stored = match bucket {
                Some(bucket) => manager.for_bucket(bucket).put(key, value.as_str(), *ttl).await,
                None => manager.put(key, value.as_str(), *ttl).await,
            };
            stored.with_context(|| format!("Failed to store '{key}'"))?;

            Ok("OK".to_string())
        }
        Commands::Invalidate { key, bucket } => {
            let removed = match bucket {
                Some(bucket) => manager.for_bucket(bucket).invalidate(key).await,
                None => manager.invalidate(key).await,
            };
            removed.with_context(|| format!("Failed to invalidate '{key}'"))?;

            Ok("OK".to_string())
        }
        Commands::InvalidateAll { bucket } => {
            manager
                .for_bucket(bucket)
                .invalidate_all()
                .await
                .with_context(|| format!("Failed to invalidate bucket '{bucket}'"))?;

            Ok("OK".to_string())
        }
        Commands::Check => {
            manager
                .ping()
                .await
                .with_context(|| format!("{} store is not reachable", manager.store().name()))?;

            Ok(format!(
                "OK: configuration valid, {} store reachable",
                manager.store().name()
            ))
        }
    }
}
