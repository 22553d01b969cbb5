//! Config command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use keel_analytics::report::ReportConfig;
use keel_analytics::MetricConfig;

use crate::cli::OutputFormat;
use crate::output::print_info;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also print the report defaults
    #[arg(long)]
    pub report: bool,
}

#[derive(Serialize)]
struct EffectiveConfig<'a> {
    metrics: &'a MetricConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<ReportConfig>,
}

/// Execute the config command.
pub fn execute(args: ConfigArgs, format: OutputFormat, config: &MetricConfig) -> Result<()> {
    let effective = EffectiveConfig {
        metrics: config,
        report: args.report.then(ReportConfig::default),
    };
    match format {
        OutputFormat::Json | OutputFormat::Minimal => {
            println!("{}", serde_json::to_string_pretty(&effective)?);
        }
        OutputFormat::Table | OutputFormat::Csv => {
            if format == OutputFormat::Table {
                print_info("Effective configuration (TOML)");
            }
            println!("{}", toml::to_string_pretty(&effective)?);
        }
    }
    Ok(())
}
