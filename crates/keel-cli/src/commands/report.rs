//! Report command implementation.
//!
//! Computes the full metric catalogue for a portfolio.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use keel_analytics::config::ComputeConfig;
use keel_analytics::registry::MetricValue;
use keel_analytics::report::{Report, ReportConfig};
use keel_analytics::var::Distribution;
use keel_analytics::MetricConfig;

use crate::cli::OutputFormat;
use crate::commands::{load_benchmark, PortfolioArgs};
use crate::output::{print_header, print_output, print_warning, KeyValue};

/// Arguments for the report command.
#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Benchmark price file, enables the benchmark-relative metrics
    #[arg(short, long)]
    pub benchmark: Option<PathBuf>,

    /// Benchmark weights. Defaults to equal weights.
    #[arg(long)]
    pub benchmark_weights: Option<String>,

    /// Return threshold for VaR
    #[arg(long, default_value = "-0.05", allow_hyphen_values = true)]
    pub var_value: f64,

    /// VaR distribution: normal, or t:<dof>
    #[arg(long, default_value = "normal")]
    pub distribution: String,

    /// Maximum drawdown and Calmar lookback
    #[arg(long, default_value = "1000")]
    pub drawdown_period: usize,

    /// Ulcer Index and Martin lookback
    #[arg(long, default_value = "14")]
    pub ulcer_period: usize,

    /// Run every metric on the calling thread
    #[arg(long)]
    pub sequential: bool,
}

/// Execute the report command.
pub fn execute(args: ReportArgs, format: OutputFormat, config: &MetricConfig, quiet: bool) -> Result<()> {
    let ctx = args.portfolio.build()?;
    let benchmark = args
        .benchmark
        .as_deref()
        .map(|path| load_benchmark(path, args.benchmark_weights.as_deref(), ctx.frequency()))
        .transpose()?;

    let distribution: Distribution = args.distribution.parse()?;
    let compute = if args.sequential {
        ComputeConfig::sequential()
    } else {
        ComputeConfig::default()
    };
    let report_config = ReportConfig::new()
        .with_drawdown_period(args.drawdown_period)
        .with_ulcer_period(args.ulcer_period)
        .with_var(args.var_value, distribution)
        .with_compute(compute);

    let (report, issues) = Report::compute(&ctx, benchmark.as_ref(), config, &report_config);

    if !quiet {
        for issue in &issues {
            print_warning(&format!("{}: {}", issue.metric, issue.error));
        }
    }

    match format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        _ => {
            let rows: Vec<KeyValue> = report
                .registry
                .iter()
                .filter_map(|(name, value)| match value {
                    MetricValue::Series(_) | MetricValue::Matrix(_) | MetricValue::OmegaCurve(_) => None,
                    other => other.headline().map(|v| KeyValue::from_f64(name, v, 6)),
                })
                .collect();
            if format == OutputFormat::Table {
                print_header(&format!("{} ({})", report.portfolio, ctx.frequency()));
            }
            print_output(&rows, format)?;
        }
    }

    Ok(())
}
