//! autodesc CLI — publish a README as a Modrinth project description.
//!
//! Designed to run as a CI step: inputs come from flags or the matching
//! `INPUT_*` environment variables.

mod actions;
mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
