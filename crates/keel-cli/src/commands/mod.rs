//! CLI command implementations.

pub mod capm;
pub mod config;
pub mod drawdown;
pub mod matrix;
pub mod normality;
pub mod omega;
pub mod report;
pub mod var;

// Re-export submodules for convenience
pub use capm::CapmArgs;
pub use config::ConfigArgs;
pub use drawdown::DrawdownArgs;
pub use matrix::MatrixArgs;
pub use normality::NormalityArgs;
pub use omega::OmegaArgs;
pub use report::ReportArgs;
pub use var::VarArgs;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::Args;

use keel_analytics::preprocess::{fill_nan, FillMethod};
use keel_analytics::{MetricConfig, PortfolioContext};
use keel_core::{Date, Frequency, PricePanel, WeightVector};

use crate::cli::MetricOverrides;
use crate::error::{CliError, CliResult};

/// Portfolio inputs shared by every command.
#[derive(Args, Debug)]
pub struct PortfolioArgs {
    /// Price file: CSV with a 'Date,<ticker>,...' header
    #[arg(short, long)]
    pub prices: PathBuf,

    /// Weights as TICKER=WEIGHT pairs. Defaults to equal weights.
    #[arg(short, long)]
    pub weights: Option<String>,

    /// Portfolio name
    #[arg(short, long, default_value = "Investment Portfolio")]
    pub name: String,

    /// Initial assets under management
    #[arg(long, default_value = "10000")]
    pub aum: f64,

    /// Observations per year: 252=Daily, 52=Weekly, 12=Monthly, 4=Quarterly, 1=Annual
    #[arg(long, default_value = "252")]
    pub frequency: u32,

    /// Fill missing prices: linear or column
    #[arg(long)]
    pub fill: Option<String>,
}

impl PortfolioArgs {
    /// Loads the prices and builds the portfolio.
    pub fn build(&self) -> CliResult<PortfolioContext> {
        let mut panel = load_prices(&self.prices)?;
        if let Some(method) = &self.fill {
            let method: FillMethod = method.parse()?;
            panel = fill_nan(&panel, method)?;
        }

        let builder = PortfolioContext::builder()
            .name(self.name.clone())
            .prices(panel)
            .initial_aum(self.aum)
            .frequency(Frequency::from_periods(self.frequency));
        let builder = match &self.weights {
            Some(spec) => builder.weights(parse_weights(spec)?),
            None => builder.equal_weights(),
        };
        Ok(builder.build()?)
    }
}

/// Builds an equally or explicitly weighted benchmark on the portfolio's
/// frequency.
pub fn load_benchmark(path: &Path, weights: Option<&str>, frequency: Frequency) -> CliResult<PortfolioContext> {
    let builder = PortfolioContext::builder()
        .name("Benchmark")
        .prices(load_prices(path)?)
        .frequency(frequency);
    let builder = match weights {
        Some(spec) => builder.weights(parse_weights(spec)?),
        None => builder.equal_weights(),
    };
    Ok(builder.build()?)
}

/// Parses a date string in YYYY-MM-DD format.
pub fn parse_date(s: &str) -> CliResult<Date> {
    Date::parse(s.trim()).map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// Parses `A=0.6,B=0.4`.
pub fn parse_weights(spec: &str) -> CliResult<WeightVector> {
    let mut entries = Vec::new();
    for pair in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (ticker, weight) = pair
            .split_once('=')
            .ok_or_else(|| CliError::InvalidWeights(spec.to_string()))?;
        let weight: f64 = weight
            .trim()
            .parse()
            .map_err(|_| CliError::InvalidWeights(spec.to_string()))?;
        entries.push((ticker.trim().to_string(), weight));
    }
    Ok(WeightVector::new(entries)?)
}

/// Loads a price panel from a CSV file.
pub fn load_prices(path: &Path) -> CliResult<PricePanel> {
    let file = std::fs::File::open(path)?;
    read_prices(file, &path.display().to_string())
}

/// Reads a price panel: first column dates, one column per ticker.
///
/// Empty cells and `NaN` are missing prices.
pub fn read_prices<R: Read>(reader: R, source: &str) -> CliResult<PricePanel> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        return Err(CliError::MissingHeader(source.to_string()));
    }
    let tickers: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut dates = Vec::new();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let date_cell = record.get(0).unwrap_or_default();
        let date = parse_date(date_cell)?;
        let row = tickers
            .iter()
            .enumerate()
            .map(|(j, ticker)| {
                let cell = record.get(j + 1).unwrap_or_default();
                parse_price(cell).ok_or_else(|| CliError::InvalidPrice {
                    ticker: ticker.clone(),
                    date: date_cell.to_string(),
                    value: cell.to_string(),
                })
            })
            .collect::<CliResult<Vec<f64>>>()?;
        dates.push(date);
        rows.push(row);
    }
    tracing::debug!(source, rows = rows.len(), tickers = tickers.len(), "loaded prices");
    Ok(PricePanel::from_rows(dates, tickers, &rows)?)
}

fn parse_price(cell: &str) -> Option<f64> {
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    cell.parse().ok()
}

/// Loads the metric configuration file, if any, and applies flag overrides.
pub fn load_metric_config(path: Option<&Path>, overrides: &MetricOverrides) -> CliResult<MetricConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            toml::from_str(&text).map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?
        }
        None => MetricConfig::default(),
    };
    if let Some(mar) = overrides.mar {
        config = config.with_mar(mar);
    }
    if let Some(rfr) = overrides.rfr {
        config = config.with_rfr(rfr);
    }
    if overrides.per_period {
        config = config.with_annual(false).with_compounding(false);
    } else if overrides.simple {
        config = config.with_compounding(false);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "Date,A,B\n2024-01-02,100,50\n2024-01-03,110,\n2024-01-04,99,49.5\n";

    #[test]
    fn test_read_prices() {
        let panel = read_prices(CSV.as_bytes(), "test").unwrap();
        assert_eq!(panel.tickers(), &["A".to_string(), "B".to_string()]);
        assert_eq!(panel.rows(), 3);
        assert!(panel.column("B").unwrap()[1].is_nan());
    }

    #[test]
    fn test_read_prices_rejects_bad_cells() {
        let csv = "Date,A\n2024-01-02,100\n2024-01-03,abc\n";
        assert!(matches!(
            read_prices(csv.as_bytes(), "test"),
            Err(CliError::InvalidPrice { .. })
        ));
        let csv = "Date\n2024-01-02\n";
        assert!(matches!(read_prices(csv.as_bytes(), "test"), Err(CliError::MissingHeader(_))));
        let csv = "Date,A\n02/01/2024,100\n";
        assert!(matches!(read_prices(csv.as_bytes(), "test"), Err(CliError::InvalidDate(_))));
    }

    #[test]
    fn test_parse_weights() {
        let w = parse_weights("A=0.6, B=0.4").unwrap();
        assert_eq!(w.get("A"), Some(0.6));
        assert_eq!(w.len(), 2);
        assert!(parse_weights("A:0.6").is_err());
        assert!(parse_weights("A=x").is_err());
    }

    #[test]
    fn test_overrides() {
        let overrides = MetricOverrides {
            mar: Some(0.05),
            per_period: true,
            ..MetricOverrides::default()
        };
        let config = load_metric_config(None, &overrides).unwrap();
        assert_eq!(config.annual_mar, 0.05);
        assert!(!config.annual);
        assert!(!config.compounding);
    }

    #[test]
    fn test_config_from_toml() {
        let config: MetricConfig = toml::from_str("annual_mar = 0.0\nannual_rfr = 0.01\n").unwrap();
        assert_eq!(config.annual_mar, 0.0);
        assert_eq!(config.annual_rfr, 0.01);
        assert!(config.annual);
    }
}
