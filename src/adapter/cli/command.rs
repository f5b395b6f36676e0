//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use crate::domain::Settlement;

/// Sharp-vs-soft odds comparison and value detection
#[derive(Parser, Debug)]
#[command(name = "vantedge")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file [default: config.toml if present]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one detection cycle over a JSON odds file
    Scan(ScanArgs),

    /// List active value opportunities
    Opportunities(OpportunitiesArgs),

    /// Record an external settlement for an active opportunity
    Settle(SettleArgs),

    /// Expire active opportunities whose match has started
    Sweep,

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// JSON array of bookmaker odds records
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Arguments for `opportunities`.
#[derive(Args, Debug)]
pub struct OpportunitiesArgs {
    /// Minimum edge in percent
    #[arg(long, default_value = "2")]
    pub min_edge: Decimal,

    /// Only this sport
    #[arg(long)]
    pub sport: Option<String>,

    /// Only this soft bookmaker
    #[arg(long)]
    pub bookmaker: Option<String>,

    /// Maximum rows (capped at 50)
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

/// Arguments for `settle`.
#[derive(Args, Debug)]
pub struct SettleArgs {
    #[arg(long)]
    pub match_key: String,

    #[arg(long)]
    pub market: String,

    #[arg(long)]
    pub selection: String,

    /// Soft bookmaker the opportunity was found at
    #[arg(long)]
    pub bookmaker: String,

    /// won or lost
    #[arg(long)]
    pub outcome: Settlement,
}

/// Subcommands for `config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate the configuration file
    Validate,
    /// Display the effective configuration with defaults applied
    Show,
}
