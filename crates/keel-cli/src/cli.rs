//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::{
    CapmArgs, ConfigArgs, DrawdownArgs, MatrixArgs, NormalityArgs, OmegaArgs, ReportArgs, VarArgs,
};

/// Keel - Portfolio risk and performance analytics CLI
#[derive(Parser)]
#[command(name = "keel")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Metric configuration file (TOML)
    #[arg(short, long, global = true, env = "KEEL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: MetricOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

/// Command-line overrides of the metric configuration.
#[derive(Args, Debug, Default)]
pub struct MetricOverrides {
    /// Annual minimum acceptable return (e.g. 0.03)
    #[arg(long, global = true)]
    pub mar: Option<f64>,

    /// Annual risk-free rate (e.g. 0.02)
    #[arg(long, global = true)]
    pub rfr: Option<f64>,

    /// Report per-period statistics instead of annualised ones
    #[arg(long, global = true)]
    pub per_period: bool,

    /// Annualise with the arithmetic instead of the geometric mean
    #[arg(long, global = true)]
    pub simple: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Compute the full metric catalogue
    Report(ReportArgs),

    /// Drawdown, Calmar, Sterling, Ulcer and Martin
    Drawdown(DrawdownArgs),

    /// Analytical and historical Value-at-Risk
    Var(VarArgs),

    /// Omega ratio and Omega curve
    Omega(OmegaArgs),

    /// Covariance or correlation matrix of the asset returns
    Matrix(MatrixArgs),

    /// Normality tests on the portfolio returns
    Normality(NormalityArgs),

    /// CAPM and benchmark-relative ratios
    Capm(CapmArgs),

    /// Show the configuration in effect
    Config(ConfigArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// Minimal output (just the value)
    Minimal,
}
