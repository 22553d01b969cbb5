//! Drawdown command implementation.
//!
//! Reports maximum drawdown and the drawdown-based ratios.

use anyhow::Result;
use clap::Args;

use keel_analytics::drawdown::{calmar, drawdowns, maximum_drawdown, sterling};
use keel_analytics::ulcer::{martin, ulcer_index};
use keel_analytics::MetricConfig;

use crate::cli::OutputFormat;
use crate::commands::PortfolioArgs;
use crate::output::{print_header, print_output, series_rows, KeyValue};

/// Arguments for the drawdown command.
#[derive(Args, Debug)]
pub struct DrawdownArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Maximum drawdown lookback, in observations
    #[arg(long, default_value = "1000")]
    pub period: usize,

    /// Ulcer Index lookback, in observations
    #[arg(long, default_value = "14")]
    pub ulcer_period: usize,

    /// Drawdowns averaged by the Sterling ratio
    #[arg(long, default_value = "3")]
    pub sterling: usize,

    /// Print the full drawdown path instead of the summary
    #[arg(long)]
    pub path: bool,
}

/// Execute the drawdown command.
pub fn execute(args: DrawdownArgs, format: OutputFormat, config: &MetricConfig) -> Result<()> {
    let ctx = args.portfolio.build()?;

    if args.path {
        return print_output(&series_rows(&drawdowns(&ctx)?), format);
    }

    let mdd = maximum_drawdown(&ctx, args.period)?;
    let ulcer = ulcer_index(&ctx, args.ulcer_period, 1)?;

    let mut results = vec![
        KeyValue::from_f64("Maximum Drawdown", mdd.value, 2),
        KeyValue::from_percent("Maximum Drawdown %", mdd.percentage),
        KeyValue::from_f64("Peak", mdd.peak, 2),
        KeyValue::new("Peak Date", mdd.peak_date.to_string()),
        KeyValue::from_f64("Trough", mdd.trough, 2),
        KeyValue::new("Trough Date", mdd.trough_date.to_string()),
        KeyValue::new("Window", mdd.window.effective.to_string()),
        KeyValue::from_f64("Ulcer Index", ulcer.value, 4),
    ];
    for (label, value) in [
        ("Calmar", calmar(&ctx, args.period, config)),
        ("Sterling", sterling(&ctx, args.sterling, config)),
        ("Martin", martin(&ctx, args.ulcer_period, config)),
    ] {
        let shown = value.map_or_else(|e| format!("n/a ({e})"), |v| format!("{v:.4}"));
        results.push(KeyValue::new(label, shown));
    }

    if format == OutputFormat::Table {
        print_header(&format!("Drawdowns: {}", ctx.name()));
    }
    print_output(&results, format)
}
