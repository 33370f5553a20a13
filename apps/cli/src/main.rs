//! eksreview CLI: compile an EKS operational review into a PDF report.
//!
//! Reads pillar findings and risk counts from a JSON/TOML file and writes
//! a paginated document with a risk chart, per-pillar sections, references
//! and scheduled recommendations.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
