mod api;
mod cards;
mod cli;
mod error;
mod feed;
mod logging;
mod model;
#[cfg(feature = "tui")]
mod orchestrator;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args).await
}
