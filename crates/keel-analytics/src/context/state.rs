//! Derived tables held by a [`PortfolioContext`](super::PortfolioContext).

use serde::{Deserialize, Serialize};

use keel_core::{Date, Series};

use crate::error::{AnalyticsError, AnalyticsResult};

/// Label of the synthetic total-value column.
pub const WHOLE_PORTFOLIO: &str = "Whole Portfolio";

/// Dollar value of each position over time, plus the portfolio total.
///
/// Buy-and-hold: share counts are fixed on the first date and never
/// rebalanced. Indexed by every price date, so the first total equals the
/// initial AUM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    dates: Vec<Date>,
    labels: Vec<String>,
    #[serde(with = "keel_core::float_serde::nested")]
    columns: Vec<Vec<f64>>,
}

impl PortfolioState {
    pub(crate) fn new(dates: Vec<Date>, tickers: &[String], mut columns: Vec<Vec<f64>>) -> Self {
        let total: Vec<f64> = (0..dates.len())
            .map(|i| columns.iter().map(|c| c[i]).sum())
            .collect();
        columns.push(total);

        let mut labels = tickers.to_vec();
        labels.push(WHOLE_PORTFOLIO.to_string());

        Self {
            dates,
            labels,
            columns,
        }
    }

    /// Row dates.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Column labels: tickers followed by [`WHOLE_PORTFOLIO`].
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always false; a state has at least two rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Value column for a ticker or [`WHOLE_PORTFOLIO`].
    #[must_use]
    pub fn column(&self, label: &str) -> Option<&[f64]> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|j| self.columns[j].as_slice())
    }

    /// Total portfolio value per date.
    #[must_use]
    pub fn whole_portfolio(&self) -> &[f64] {
        // the total is always pushed last
        &self.columns[self.columns.len() - 1]
    }

    /// A column as a named series.
    pub fn series(&self, label: &str) -> AnalyticsResult<Series> {
        let values = self
            .column(label)
            .ok_or_else(|| AnalyticsError::invalid_input(format!("no state column '{label}'")))?;
        Ok(Series::new(label, self.dates.clone(), values.to_vec())?)
    }
}

/// Simple per-period returns of every asset.
///
/// One row fewer than the price panel: the first date has no return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReturns {
    dates: Vec<Date>,
    tickers: Vec<String>,
    #[serde(with = "keel_core::float_serde::nested")]
    columns: Vec<Vec<f64>>,
}

impl AssetReturns {
    pub(crate) fn from_prices(dates: &[Date], tickers: &[String], prices: &[Vec<f64>]) -> Self {
        let columns = prices
            .iter()
            .map(|column| column.windows(2).map(|w| w[1] / w[0] - 1.0).collect())
            .collect();
        Self {
            dates: dates[1..].to_vec(),
            tickers: tickers.to_vec(),
            columns,
        }
    }

    /// Return dates (every price date but the first).
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Tickers in column order.
    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Return columns in ticker order.
    #[must_use]
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Number of return dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// True when there are no return dates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Return column for a ticker.
    #[must_use]
    pub fn column(&self, ticker: &str) -> Option<&[f64]> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|j| self.columns[j].as_slice())
    }

    /// Weighted sum across assets for every date.
    pub(crate) fn weighted(&self, weights: &[f64]) -> Vec<f64> {
        (0..self.dates.len())
            .map(|i| {
                self.columns
                    .iter()
                    .zip(weights)
                    .map(|(c, w)| c[i] * w)
                    .sum()
            })
            .collect()
    }
}

/// Summary moments of the portfolio return series, computed once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moments {
    /// Per-period arithmetic mean.
    #[serde(with = "keel_core::float_serde")]
    pub mean: f64,
    /// `mean × frequency`.
    #[serde(with = "keel_core::float_serde")]
    pub arithmetic_mean: f64,
    /// `Π(1 + r)^(frequency / n) - 1`.
    #[serde(with = "keel_core::float_serde")]
    pub geometric_mean: f64,
    /// Sample standard deviation (ddof = 1).
    #[serde(with = "keel_core::float_serde")]
    pub volatility: f64,
    /// `volatility × √frequency`.
    #[serde(with = "keel_core::float_serde")]
    pub annual_volatility: f64,
    /// Number of returns.
    pub observations: usize,
}

impl Moments {
    pub(crate) fn compute(returns: &[f64], frequency: f64) -> AnalyticsResult<Self> {
        let n = returns.len();
        if n < 2 {
            return Err(AnalyticsError::insufficient_data("portfolio returns", 2, n));
        }
        let mean = keel_math::statistics::mean(returns)?;
        let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
        let volatility = keel_math::statistics::std_dev(returns, 1)?;
        Ok(Self {
            mean,
            arithmetic_mean: mean * frequency,
            geometric_mean: growth.powf(frequency / n as f64) - 1.0,
            volatility,
            annual_volatility: volatility * frequency.sqrt(),
            observations: n,
        })
    }
}
