use std::io;

use anyhow::{Context, Result};
use aquachain_cli::{App, Cli, Settings};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(storage) = cli.storage {
        settings.storage_path = storage;
    }

    let mut app = App::open(settings, cli.json);
    let mut stdout = io::stdout().lock();
    if let Err(err) = app.run(cli.command, &mut stdout).await {
        error!("{err:#}");
        return Err(err);
    }
    Ok(())
}
