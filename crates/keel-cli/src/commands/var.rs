//! VaR command implementation.

use anyhow::Result;
use clap::Args;

use keel_analytics::var::{analytical_var, historical_var, historical_var_histogram, Distribution};
use keel_analytics::MetricConfig;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::commands::PortfolioArgs;
use crate::output::{print_header, print_output, KeyValue};

/// Arguments for the var command.
#[derive(Args, Debug)]
pub struct VarArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Return threshold (e.g. -0.05)
    #[arg(short, long, allow_hyphen_values = true)]
    pub value: f64,

    /// Distribution: normal, or t:<dof>
    #[arg(short, long, default_value = "normal")]
    pub distribution: String,

    /// Print a histogram of the returns with this many bins
    #[arg(long)]
    pub bins: Option<usize>,
}

#[derive(Debug, Serialize, Tabled)]
struct HistogramRow {
    #[tabled(rename = "From")]
    from: f64,
    #[tabled(rename = "To")]
    to: f64,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Below Threshold")]
    below: bool,
}

/// Execute the var command.
pub fn execute(args: VarArgs, format: OutputFormat, config: &MetricConfig) -> Result<()> {
    let ctx = args.portfolio.build()?;

    if let Some(bins) = args.bins {
        let hist = historical_var_histogram(&ctx, args.value, bins)?;
        let rows: Vec<HistogramRow> = hist
            .counts
            .iter()
            .enumerate()
            .map(|(i, count)| HistogramRow {
                from: hist.edges[i],
                to: hist.edges[i + 1],
                count: *count,
                below: i < hist.cutoff_bin,
            })
            .collect();
        return print_output(&rows, format);
    }

    let distribution: Distribution = args.distribution.parse()?;
    let var = analytical_var(&ctx, args.value, distribution, config)?;

    let results = vec![
        KeyValue::new("Distribution", distribution.to_string()),
        KeyValue::from_f64("Threshold", args.value, 4),
        KeyValue::from_percent("Probability", var.probability),
        KeyValue::from_percent("Expected Loss", var.expected_loss),
        KeyValue::from_f64("Location", var.mean, 6),
        KeyValue::from_f64("Scale", var.scale, 6),
        KeyValue::from_percent("Historical Probability", historical_var(&ctx, args.value)),
    ];

    if format == OutputFormat::Table {
        print_header(&format!("Value-at-Risk: {}", ctx.name()));
    }
    print_output(&results, format)
}
