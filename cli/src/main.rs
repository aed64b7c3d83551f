//! # Meridian Scenario Driver
//!
//! Entry point for the `meridian` binary. Parses CLI arguments,
//! initializes logging, replays a scenario file against a fresh vault,
//! and prints the final state report to stdout as JSON.
//!
//! The binary supports two subcommands:
//!
//! - `run`     — execute a scenario file
//! - `version` — print build version information

mod cli;
mod logging;
mod scenario;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Commands, MeridianCli, RunArgs};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = MeridianCli::parse();

    match cli.command {
        Commands::Run(args) => run_scenario(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Loads, replays, and reports a scenario.
fn run_scenario(args: RunArgs) -> Result<()> {
    logging::init_logging(
        &args.log_level,
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(scenario = %args.scenario.display(), "replaying scenario");

    let raw = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("failed to read scenario file: {}", args.scenario.display()))?;
    let scenario: scenario::Scenario = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse scenario file: {}", args.scenario.display()))?;

    let report = scenario::run(&scenario)
        .with_context(|| format!("scenario failed: {}", args.scenario.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Prints version information.
fn print_version() {
    println!("meridian {}", env!("CARGO_PKG_VERSION"));
}
