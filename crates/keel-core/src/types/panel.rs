//! Price panel: one adjusted-close series per asset over a shared date index.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use super::{Date, Series};
use crate::error::{CoreError, CoreResult};

/// Table of asset prices, rows = trading dates, columns = tickers.
///
/// Stored column-major: `columns[j][i]` is the price of `tickers[j]` on
/// `dates[i]`. Invariants checked by [`PricePanel::new`]:
///
/// - at least two dates, strictly increasing
/// - at least one ticker, no duplicates
/// - every column has one value per date
/// - no column is entirely missing (NaN)
///
/// Missing values inside a column are allowed and propagate through
/// every calculation; see `keel_analytics::preprocess::fill_nan`.
/// Deserialization goes through [`PricePanel::new`], so the invariants
/// hold for panels read from JSON too.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePanel {
    dates: Vec<Date>,
    tickers: Vec<String>,
    #[serde(serialize_with = "crate::float_serde::nested::serialize")]
    columns: Vec<Vec<f64>>,
}

impl<'de> Deserialize<'de> for PricePanel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct PricePanelData {
            dates: Vec<Date>,
            tickers: Vec<String>,
            #[serde(with = "crate::float_serde::nested")]
            columns: Vec<Vec<f64>>,
        }

        let data = PricePanelData::deserialize(deserializer)?;
        PricePanel::new(data.dates, data.tickers, data.columns).map_err(serde::de::Error::custom)
    }
}

impl PricePanel {
    /// Creates a validated panel.
    pub fn new(dates: Vec<Date>, tickers: Vec<String>, columns: Vec<Vec<f64>>) -> CoreResult<Self> {
        if dates.len() < 2 {
            return Err(CoreError::insufficient_data(2, dates.len()));
        }
        if tickers.is_empty() {
            return Err(CoreError::invalid_input("price panel has no tickers"));
        }
        if tickers.len() != columns.len() {
            return Err(CoreError::length_mismatch("price columns", tickers.len(), columns.len()));
        }

        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(CoreError::UnorderedDates {
                    previous: pair[0].to_string(),
                    next: pair[1].to_string(),
                });
            }
        }

        let mut seen = HashSet::with_capacity(tickers.len());
        for ticker in &tickers {
            if !seen.insert(ticker.as_str()) {
                return Err(CoreError::DuplicateTicker {
                    ticker: ticker.clone(),
                });
            }
        }

        for (ticker, column) in tickers.iter().zip(&columns) {
            if column.len() != dates.len() {
                return Err(CoreError::length_mismatch(
                    format!("column '{ticker}'"),
                    dates.len(),
                    column.len(),
                ));
            }
            if column.iter().all(|p| p.is_nan()) {
                return Err(CoreError::EmptyColumn {
                    ticker: ticker.clone(),
                });
            }
        }

        log::debug!(
            "price panel: {} tickers x {} dates ({} .. {})",
            tickers.len(),
            dates.len(),
            dates[0],
            dates[dates.len() - 1]
        );

        Ok(Self {
            dates,
            tickers,
            columns,
        })
    }

    /// Builds a panel from row-major data (one `Vec` of prices per date).
    pub fn from_rows(dates: Vec<Date>, tickers: Vec<String>, rows: &[Vec<f64>]) -> CoreResult<Self> {
        if rows.len() != dates.len() {
            return Err(CoreError::length_mismatch("price rows", dates.len(), rows.len()));
        }
        let mut columns = vec![Vec::with_capacity(rows.len()); tickers.len()];
        for row in rows {
            if row.len() != tickers.len() {
                return Err(CoreError::length_mismatch("price row", tickers.len(), row.len()));
            }
            for (column, price) in columns.iter_mut().zip(row) {
                column.push(*price);
            }
        }
        Self::new(dates, tickers, columns)
    }

    /// Number of dates.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.dates.len()
    }

    /// Number of tickers.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.tickers.len()
    }

    /// The date index.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Ticker names in column order.
    #[must_use]
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// All price columns in ticker order.
    #[must_use]
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    /// Position of a ticker in the column order.
    #[must_use]
    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }

    /// Price column for a ticker.
    pub fn column(&self, ticker: &str) -> CoreResult<&[f64]> {
        self.index_of(ticker)
            .map(|j| self.columns[j].as_slice())
            .ok_or_else(|| CoreError::UnknownTicker {
                ticker: ticker.to_string(),
            })
    }

    /// Prices of every ticker on the first date.
    #[must_use]
    pub fn first_row(&self) -> Vec<f64> {
        self.columns.iter().map(|c| c[0]).collect()
    }

    /// A single ticker's prices as a named series.
    pub fn series(&self, ticker: &str) -> CoreResult<Series> {
        let values = self.column(ticker)?.to_vec();
        Series::new(ticker, self.dates.clone(), values)
    }

    /// Returns a panel with the same index and tickers but new prices.
    pub fn with_columns(&self, columns: Vec<Vec<f64>>) -> CoreResult<Self> {
        Self::new(self.dates.clone(), self.tickers.clone(), columns)
    }

    /// Returns true if any price is missing.
    #[must_use]
    pub fn has_missing(&self) -> bool {
        self.columns.iter().flatten().any(|p| p.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: u32) -> Vec<Date> {
        (1..=n).map(|d| Date::from_ymd(2024, 1, d).unwrap()).collect()
    }

    #[test]
    fn test_new_panel() {
        let panel = PricePanel::new(
            dates(3),
            vec!["A".into(), "B".into()],
            vec![vec![100.0, 110.0, 99.0], vec![50.0, 55.0, 49.5]],
        )
        .unwrap();

        assert_eq!(panel.rows(), 3);
        assert_eq!(panel.cols(), 2);
        assert_eq!(panel.first_row(), vec![100.0, 50.0]);
        assert_eq!(panel.column("B").unwrap()[2], 49.5);
        assert!(panel.column("C").is_err());
        assert!(!panel.has_missing());
    }

    #[test]
    fn test_from_rows() {
        let panel = PricePanel::from_rows(
            dates(2),
            vec!["A".into(), "B".into()],
            &[vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .unwrap();
        assert_eq!(panel.column("A").unwrap(), &[1.0, 3.0]);
        assert_eq!(panel.column("B").unwrap(), &[2.0, 4.0]);
    }

    #[test]
    fn test_requires_two_rows() {
        let err = PricePanel::new(dates(1), vec!["A".into()], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientData { required: 2, actual: 1 }));
    }

    #[test]
    fn test_rejects_unordered_dates() {
        let mut d = dates(3);
        d.swap(1, 2);
        let err = PricePanel::new(d, vec!["A".into()], vec![vec![1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, CoreError::UnorderedDates { .. }));
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let mut d = dates(2);
        d[1] = d[0];
        assert!(PricePanel::new(d, vec!["A".into()], vec![vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_rejects_empty_column() {
        let err = PricePanel::new(
            dates(2),
            vec!["A".into(), "B".into()],
            vec![vec![1.0, 2.0], vec![f64::NAN, f64::NAN]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::EmptyColumn {
                ticker: "B".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_ticker() {
        let err = PricePanel::new(
            dates(2),
            vec!["A".into(), "A".into()],
            vec![vec![1.0, 2.0], vec![1.0, 2.0]],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateTicker { .. }));
    }

    #[test]
    fn test_partial_missing_allowed() {
        let panel = PricePanel::new(dates(3), vec!["A".into()], vec![vec![1.0, f64::NAN, 3.0]]).unwrap();
        assert!(panel.has_missing());
    }

    #[test]
    fn test_json_keeps_missing_prices() {
        let panel = PricePanel::new(dates(3), vec!["A".into()], vec![vec![100.0, f64::NAN, 99.0]]).unwrap();
        let json = serde_json::to_string(&panel).unwrap();
        assert!(json.contains("[100.0,null,99.0]"));

        let back: PricePanel = serde_json::from_str(&json).unwrap();
        assert_eq!(back.dates(), panel.dates());
        assert!(back.column("A").unwrap()[1].is_nan());
        assert_eq!(back.column("A").unwrap()[2], 99.0);
    }

    #[test]
    fn test_json_rejects_malformed_panel() {
        let short_column = r#"{"dates":["2024-01-01","2024-01-02","2024-01-03"],"tickers":["A"],"columns":[[100.0,101.0]]}"#;
        let err = serde_json::from_str::<PricePanel>(short_column).unwrap_err();
        assert!(err.to_string().contains("column 'A'"));

        let unordered = r#"{"dates":["2024-01-02","2024-01-01"],"tickers":["A"],"columns":[[100.0,101.0]]}"#;
        assert!(serde_json::from_str::<PricePanel>(unordered).is_err());

        let one_row = r#"{"dates":["2024-01-01"],"tickers":["A"],"columns":[[100.0]]}"#;
        assert!(serde_json::from_str::<PricePanel>(one_row).is_err());

        let missing_ticker = r#"{"dates":["2024-01-01","2024-01-02"],"tickers":["A","B"],"columns":[[100.0,101.0]]}"#;
        assert!(serde_json::from_str::<PricePanel>(missing_ticker).is_err());
    }
}
