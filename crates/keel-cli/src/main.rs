//! Keel CLI - Command-line interface for portfolio risk analytics.
//!
//! # Usage
//!
//! ```bash
//! # Full metric report for an equally weighted portfolio
//! keel report --prices prices.csv
//!
//! # Drawdowns with a one-year lookback
//! keel drawdown --prices prices.csv --weights AAPL=0.6,MSFT=0.4 --period 252
//!
//! # Student-t VaR at a -5% daily return
//! keel var --prices prices.csv --value -0.05 --distribution t:5
//!
//! # CAPM against a benchmark
//! keel capm --prices prices.csv --benchmark spy.csv
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "error" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let format = cli.format;
    let config = commands::load_metric_config(cli.config.as_deref(), &cli.overrides)?;
    tracing::debug!(?config, "metric configuration");

    match cli.command {
        Commands::Report(args) => commands::report::execute(args, format, &config, cli.quiet)?,
        Commands::Drawdown(args) => commands::drawdown::execute(args, format, &config)?,
        Commands::Var(args) => commands::var::execute(args, format, &config)?,
        Commands::Omega(args) => commands::omega::execute(args, format, &config)?,
        Commands::Matrix(args) => commands::matrix::execute(args, format, &config)?,
        Commands::Normality(args) => commands::normality::execute(args, format, &config)?,
        Commands::Capm(args) => commands::capm::execute(args, format, &config)?,
        Commands::Config(args) => commands::config::execute(args, format, &config)?,
    }

    Ok(())
}
