//! # CLI Interface
//!
//! Defines the command-line argument structure for the `meridian`
//! binary using `clap` derive. Two subcommands: `run` and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Meridian ledger scenario driver.
///
/// Replays a JSON scenario of timestamped ledger and vault operations
/// against a fresh in-memory vault and prints the resulting state as
/// JSON. Because the core runs on a caller-supplied logical clock,
/// replays are fully deterministic: the same scenario always produces
/// the same report.
#[derive(Parser, Debug)]
#[command(
    name = "meridian",
    about = "Meridian ledger scenario driver",
    version,
    propagate_version = true
)]
pub struct MeridianCli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the meridian binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a scenario file and print the final state report.
    Run(RunArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the scenario file (JSON).
    pub scenario: PathBuf,

    /// Default log level when `RUST_LOG` is not set.
    #[arg(long, env = "MERIDIAN_LOG", default_value = "info")]
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "MERIDIAN_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,
}
