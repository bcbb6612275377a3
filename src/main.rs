use bucket_cache::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    tracing::debug!(
        version = bucket_cache::pkg_version(),
        backend = ?settings.cache.backend,
        "Starting {}",
        settings.application.name
    );

    execute_command(&cli, settings).await
}
