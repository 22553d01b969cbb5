//! CAPM command implementation.
//!
//! Regresses the portfolio on a benchmark and reports the relative ratios.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use keel_analytics::benchmark::{
    capm, downside_capm, downside_volatility_ratio, jensen_alpha, omega_excess_return, tracking_error,
    treynor,
};
use keel_analytics::MetricConfig;

use crate::cli::OutputFormat;
use crate::commands::{load_benchmark, PortfolioArgs};
use crate::output::{print_header, print_output, KeyValue};

/// Arguments for the capm command.
#[derive(Args, Debug)]
pub struct CapmArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Benchmark price file
    #[arg(short, long)]
    pub benchmark: PathBuf,

    /// Benchmark weights. Defaults to equal weights.
    #[arg(long)]
    pub benchmark_weights: Option<String>,
}

/// Execute the capm command.
pub fn execute(args: CapmArgs, format: OutputFormat, config: &MetricConfig) -> Result<()> {
    let ctx = args.portfolio.build()?;
    let bench = load_benchmark(&args.benchmark, args.benchmark_weights.as_deref(), ctx.frequency())?;

    let fit = capm(&ctx, &bench, config)?;
    let mut results = vec![
        KeyValue::from_f64("Alpha", fit.alpha, 6),
        KeyValue::from_f64("Beta", fit.beta, 4),
        KeyValue::from_f64("R²", fit.r_squared, 4),
        KeyValue::new("Observations", fit.observations.to_string()),
    ];

    let ratios = [
        ("Tracking Error", tracking_error(&ctx, &bench)),
        ("Jensen's Alpha", jensen_alpha(&ctx, &bench, config)),
        ("Treynor", treynor(&ctx, &bench, config)),
        ("Downside Volatility Ratio", downside_volatility_ratio(&ctx, &bench, config)),
        ("Omega Excess Return", omega_excess_return(&ctx, &bench, config)),
        ("Downside Beta", downside_capm(&ctx, &bench, config).map(|down| down.beta)),
    ];
    for (label, value) in ratios {
        let shown = value.map_or_else(|e| format!("n/a ({e})"), |v| format!("{v:.6}"));
        results.push(KeyValue::new(label, shown));
    }

    if format == OutputFormat::Table {
        print_header(&format!("{} vs {}", ctx.name(), bench.name()));
    }
    print_output(&results, format)
}
