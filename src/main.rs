mod cli;
mod commands;
mod error;
mod page_range;
mod pdf;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use pdf::ScrubMode;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mode = if cli.redact {
        ScrubMode::Redact
    } else {
        ScrubMode::Delete
    };
    commands::scrub::run(&cli.input, &cli.pages, mode, cli.output)?;

    Ok(())
}
