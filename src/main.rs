mod auth;
mod cli;
mod error;
mod format;
mod models;
mod providers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting RepoLens - Repository Insights Tool");
    cli.execute().await?;

    Ok(())
}
