mod artifacts;
mod cli;
mod error;
mod extract;
mod history;
mod insights;
mod trends;
mod xml;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting TestLens - XML Test History Insights Tool");
    cli.execute()?;

    Ok(())
}
