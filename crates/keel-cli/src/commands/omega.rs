//! Omega command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use keel_analytics::config::ComputeConfig;
use keel_analytics::omega::{omega_curve, omega_ratio, MarSweep};
use keel_analytics::MetricConfig;

use crate::cli::OutputFormat;
use crate::commands::PortfolioArgs;
use crate::output::{print_header, print_output, print_warning, KeyValue};

/// Arguments for the omega command.
#[derive(Args, Debug)]
pub struct OmegaArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Lowest annual MAR of the sweep
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    pub lower: f64,

    /// Highest annual MAR of the sweep
    #[arg(long, default_value = "0.2", allow_hyphen_values = true)]
    pub upper: f64,

    /// Sweep step
    #[arg(long, default_value = "0.01")]
    pub step: f64,
}

#[derive(Debug, Serialize, Tabled)]
struct CurveRow {
    #[tabled(rename = "Annual MAR")]
    mar: f64,
    #[tabled(rename = "Omega")]
    omega: f64,
}

/// Execute the omega command.
pub fn execute(args: OmegaArgs, format: OutputFormat, config: &MetricConfig) -> Result<()> {
    let ctx = args.portfolio.build()?;
    let sweep = MarSweep::new(args.lower, args.upper, args.step);
    let curve = omega_curve(&ctx, &sweep, &ComputeConfig::default())?;
    let rows: Vec<CurveRow> = curve
        .points
        .iter()
        .map(|p| CurveRow {
            mar: p.annual_mar,
            omega: p.omega,
        })
        .collect();

    if format != OutputFormat::Table {
        return print_output(&rows, format);
    }

    print_header(&format!("Omega: {}", ctx.name()));
    match omega_ratio(&ctx, config) {
        Ok(omega) => print_output(
            &[KeyValue::from_f64(format!("Omega at MAR {}", config.annual_mar), omega, 4)],
            format,
        )?,
        Err(e) => print_warning(&format!("omega ratio: {e}")),
    }
    print_output(&rows, format)
}
