//! Date-indexed numeric series.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

use super::Date;
use crate::error::{CoreError, CoreResult};

/// A named sequence of values keyed by date.
///
/// Used for return series, portfolio value paths, drawdown paths and any
/// other per-date output. Dates are strictly increasing, also for series
/// read back from JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    name: String,
    dates: Vec<Date>,
    #[serde(serialize_with = "crate::float_serde::vec::serialize")]
    values: Vec<f64>,
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct SeriesData {
            name: String,
            dates: Vec<Date>,
            #[serde(with = "crate::float_serde::vec")]
            values: Vec<f64>,
        }

        let data = SeriesData::deserialize(deserializer)?;
        Series::new(data.name, data.dates, data.values).map_err(serde::de::Error::custom)
    }
}

impl Series {
    /// Creates a series, checking lengths and date ordering.
    pub fn new(name: impl Into<String>, dates: Vec<Date>, values: Vec<f64>) -> CoreResult<Self> {
        let name = name.into();
        if dates.len() != values.len() {
            return Err(CoreError::length_mismatch(
                format!("series '{name}'"),
                dates.len(),
                values.len(),
            ));
        }
        for pair in dates.windows(2) {
            if pair[1] <= pair[0] {
                return Err(CoreError::UnorderedDates {
                    previous: pair[0].to_string(),
                    next: pair[1].to_string(),
                });
            }
        }
        Ok(Self {
            name,
            dates,
            values,
        })
    }

    /// Series name (a ticker, "Whole Portfolio", a metric label, ...).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the series renamed.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The date index.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// The values in date order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value on a given date.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|i| self.values[i])
    }

    /// The most recent observation.
    #[must_use]
    pub fn last(&self) -> Option<(Date, f64)> {
        self.dates.last().copied().zip(self.values.last().copied())
    }

    /// Iterates over `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Applies `f` to every value, keeping the index.
    #[must_use]
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            name: self.name.clone(),
            dates: self.dates.clone(),
            values: self.values.iter().map(|v| f(*v)).collect(),
        }
    }

    /// The trailing `n` observations (or all of them if `n` exceeds the length).
    #[must_use]
    pub fn tail(&self, n: usize) -> Self {
        let start = self.len().saturating_sub(n);
        Self {
            name: self.name.clone(),
            dates: self.dates[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }

    /// Inner-joins two series on date.
    ///
    /// Returns the shared dates with the matching values of each side.
    #[must_use]
    pub fn align(&self, other: &Series) -> (Vec<Date>, Vec<f64>, Vec<f64>) {
        let lookup: HashMap<Date, f64> = other.iter().collect();
        let mut dates = Vec::new();
        let mut left = Vec::new();
        let mut right = Vec::new();
        for (date, value) in self.iter() {
            if let Some(v) = lookup.get(&date) {
                dates.push(date);
                left.push(value);
                right.push(*v);
            }
        }
        (dates, left, right)
    }
}
