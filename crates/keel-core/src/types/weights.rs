//! Portfolio weight vector.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};

/// Fractional allocation per ticker.
///
/// Weights need not sum to one; ratios computed from them implicitly
/// assume a fully invested portfolio, so a sum near one is recommended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightVector {
    entries: Vec<(String, f64)>,
}

impl<'de> Deserialize<'de> for WeightVector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct WeightVectorData {
            entries: Vec<(String, f64)>,
        }

        let data = WeightVectorData::deserialize(deserializer)?;
        WeightVector::new(data.entries).map_err(serde::de::Error::custom)
    }
}

impl WeightVector {
    /// Creates a weight vector from `(ticker, weight)` pairs.
    pub fn new(entries: Vec<(String, f64)>) -> CoreResult<Self> {
        if entries.is_empty() {
            return Err(CoreError::invalid_input("weight vector is empty"));
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for (ticker, weight) in &entries {
            if !seen.insert(ticker.as_str()) {
                return Err(CoreError::DuplicateTicker {
                    ticker: ticker.clone(),
                });
            }
            if !weight.is_finite() {
                return Err(CoreError::invalid_input(format!(
                    "weight for '{ticker}' is not finite"
                )));
            }
        }
        Ok(Self { entries })
    }

    /// Pairs tickers with weights positionally.
    pub fn from_parts(tickers: &[String], weights: &[f64]) -> CoreResult<Self> {
        if tickers.len() != weights.len() {
            return Err(CoreError::length_mismatch("weights", tickers.len(), weights.len()));
        }
        Self::new(tickers.iter().cloned().zip(weights.iter().copied()).collect())
    }

    /// Equal weights across the given tickers.
    pub fn equal(tickers: &[String]) -> CoreResult<Self> {
        if tickers.is_empty() {
            return Err(CoreError::invalid_input("weight vector is empty"));
        }
        let w = 1.0 / tickers.len() as f64;
        Self::new(tickers.iter().map(|t| (t.clone(), w)).collect())
    }

    /// Weight for a ticker.
    #[must_use]
    pub fn get(&self, ticker: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, w)| *w)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }

    /// Iterates over `(ticker, weight)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(t, w)| (t.as_str(), *w))
    }

    /// Weights re-ordered to match `tickers`.
    ///
    /// Fails unless the ticker sets are identical.
    pub fn aligned_to(&self, tickers: &[String]) -> CoreResult<Vec<f64>> {
        if tickers.len() != self.entries.len() {
            return Err(CoreError::length_mismatch("weights", tickers.len(), self.entries.len()));
        }
        tickers
            .iter()
            .map(|t| {
                self.get(t).ok_or_else(|| CoreError::UnknownTicker { ticker: t.clone() })
            })
            .collect()
    }
}
