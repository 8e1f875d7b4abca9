mod cli;
mod config;
mod error;
mod logs;
mod measure;
mod output;
mod pipeline;
mod providers;
mod timespan;
mod timings;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting PhaseLens - CI log phase timing tool");
    cli.execute().await?;

    Ok(())
}
