//! Matrix command implementation.

use anyhow::Result;
use clap::{Args, ValueEnum};

use keel_analytics::dispersion::{correlation_matrix, covariance_matrix, DEFAULT_DECIMALS};
use keel_analytics::MetricConfig;

use crate::cli::OutputFormat;
use crate::commands::PortfolioArgs;
use crate::output::{print_header, print_matrix};

/// Which dispersion matrix to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MatrixKind {
    /// Pearson correlation
    #[default]
    Corr,
    /// Covariance
    Cov,
}

/// Arguments for the matrix command.
#[derive(Args, Debug)]
pub struct MatrixArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Matrix to compute
    #[arg(short, long, value_enum, default_value = "corr")]
    pub kind: MatrixKind,

    /// Decimals kept in every entry
    #[arg(short, long, default_value_t = DEFAULT_DECIMALS)]
    pub decimals: u32,
}

/// Execute the matrix command.
///
/// Covariances are annualised unless the configuration is per-period.
pub fn execute(args: MatrixArgs, format: OutputFormat, config: &MetricConfig) -> Result<()> {
    let ctx = args.portfolio.build()?;
    let (title, matrix) = match args.kind {
        MatrixKind::Corr => ("Correlation", correlation_matrix(&ctx, args.decimals)?),
        MatrixKind::Cov => ("Covariance", covariance_matrix(&ctx, config.annual, args.decimals)?),
    };
    if format == OutputFormat::Table {
        print_header(&format!("{title}: {}", ctx.name()));
    }
    print_matrix(&matrix, format)
}
