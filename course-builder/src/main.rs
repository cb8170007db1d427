use anyhow::Result;
use clap::Parser;

use course_builder::cli::{Cli, handle_command};
use course_builder::config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, source) = config::load_with_source(cli.config.as_deref())?;

    env_logger::Builder::new()
        .parse_filters(&config.logging.level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
    log::debug!("Configuration loaded from {}", source);

    if let Err(e) = handle_command(cli, config).await {
        log::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
