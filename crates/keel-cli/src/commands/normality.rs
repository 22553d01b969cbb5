//! Normality command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use keel_analytics::diagnostics::{distribution_test, NormalityTest};
use keel_analytics::MetricConfig;

use crate::cli::OutputFormat;
use crate::commands::PortfolioArgs;
use crate::output::{print_header, print_output, print_warning};

/// Arguments for the normality command.
#[derive(Args, Debug)]
pub struct NormalityArgs {
    #[command(flatten)]
    pub portfolio: PortfolioArgs,

    /// Test name (e.g. jarque-bera, shapiro-wilk), or "all"
    #[arg(short, long, default_value = "all")]
    pub test: String,

    /// Significance level for the verdict column
    #[arg(long, default_value = "0.05")]
    pub significance: f64,
}

#[derive(Debug, Serialize, Tabled)]
struct TestRow {
    #[tabled(rename = "Test")]
    test: String,
    #[tabled(rename = "Statistic")]
    statistic: f64,
    #[tabled(rename = "p-value")]
    p_value: f64,
    #[tabled(rename = "Normal")]
    normal: bool,
}

/// Execute the normality command.
pub fn execute(args: NormalityArgs, format: OutputFormat, _config: &MetricConfig) -> Result<()> {
    let ctx = args.portfolio.build()?;
    let tests: Vec<NormalityTest> = if args.test.eq_ignore_ascii_case("all") {
        NormalityTest::ALL.to_vec()
    } else {
        vec![args.test.parse::<NormalityTest>()?]
    };

    let mut rows = Vec::with_capacity(tests.len());
    for test in tests {
        match distribution_test(&ctx, test) {
            Ok(outcome) => rows.push(TestRow {
                test: test.to_string(),
                statistic: outcome.statistic,
                p_value: outcome.p_value,
                normal: !outcome.rejects_at(args.significance),
            }),
            Err(e) => print_warning(&format!("{test}: {e}")),
        }
    }

    if format == OutputFormat::Table {
        print_header(&format!("Normality of returns: {}", ctx.name()));
    }
    print_output(&rows, format)
}
