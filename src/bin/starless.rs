use clap::Parser;
use tracing_subscriber::EnvFilter;

use starless::cli::prompt::LinePrompter;
use starless::cli::{Cli, run};
use starless::core::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;
    run(cli, config, &mut LinePrompter::stdio()).await?;
    Ok(())
}
