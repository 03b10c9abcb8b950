//! Command-line parsing for the ECC curve analyzer.
//!
//! Argument parsing and command dispatch stay separate from the analysis code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::TestMode;
use crate::io::Layout;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ecc", version, about = "ECC stress-strain curve analyzer")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to $ECC_CONFIG, then ~/.ecc_analyzer_config.json).
    #[arg(long, value_name = "JSON", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze curves from CSV files and print per-sample and group tables.
    Analyze(AnalyzeArgs),
    /// Analyze a seeded synthetic batch of tension curves.
    Demo(DemoArgs),
    /// Inspect or reset the persisted configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Threshold overrides applied on top of the loaded configuration.
#[derive(Debug, Args, Clone, Default)]
pub struct ConfigOverrides {
    /// Savitzky-Golay smoothing window (forced odd).
    #[arg(long)]
    pub smooth_window: Option<usize>,

    /// Lower bound of the elastic band (fraction of peak).
    #[arg(long)]
    pub elastic_lower: Option<f64>,

    /// Upper bound of the elastic band (fraction of peak).
    #[arg(long)]
    pub elastic_upper: Option<f64>,

    /// Post-peak stress ratio that marks failure.
    #[arg(long)]
    pub ultimate_ratio: Option<f64>,

    /// Gauge length (mm) for fracture energy.
    #[arg(long)]
    pub gauge_length: Option<f64>,

    /// Minimum crack deviation from the elastic line (MPa).
    #[arg(long)]
    pub crack_tolerance: Option<f64>,

    /// Persist the overridden configuration.
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// CSV files; each file is one group.
    #[arg(required = true, value_name = "CSV")]
    pub files: Vec<PathBuf>,

    /// Test mode.
    #[arg(short, long, value_enum, default_value_t = TestMode::Tension)]
    pub mode: TestMode,

    /// Table layout of the input files.
    #[arg(long, value_enum, default_value_t = Layout::Curves)]
    pub layout: Layout,

    /// Export results, failures and group statistics to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    /// Number of groups.
    #[arg(long, default_value_t = 2)]
    pub groups: usize,

    /// Specimens per group.
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Multiple-cracking drops per curve.
    #[arg(long, default_value_t = 6)]
    pub crack_drops: usize,

    /// Stress noise standard deviation (MPa).
    #[arg(long, default_value_t = 0.01)]
    pub noise: f64,

    /// Export results, failures and group statistics to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Subcommand, Clone, Copy)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Overwrite the config file with defaults.
    Reset,
    /// Print the resolved config file path.
    Path,
}
