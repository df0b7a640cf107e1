//! ## faketimers-cli
//! **Command-line driver for timer scenarios**
//!
//! - `run`: execute a scenario file and print its firing trace and state hash
//! - `fuzz`: run seeded random scenarios and check the fire-count laws

use clap::Parser;
use faketimers_telemetry::EventLogger;

mod commands;

use commands::{Cli, Commands};

fn main() -> anyhow::Result<()> {
    EventLogger::init();
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => commands::run_scenario(args, &config),
        Commands::Fuzz(args) => commands::run_fuzz(args, &config),
    }
}
