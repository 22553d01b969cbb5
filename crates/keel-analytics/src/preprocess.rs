//! Data preparation: missing-value filling and return concatenation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use keel_core::{Date, PricePanel, Series};
use keel_math::interpolation::LinearInterpolator;

use crate::error::{AnalyticsError, AnalyticsResult};

/// How missing values are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FillMethod {
    /// Interpolate between neighbours by row position. Trailing gaps take
    /// the last value; leading gaps stay missing.
    #[default]
    Linear,
    /// Replace with the mean of the column's present values.
    ColumnMean,
}

impl FromStr for FillMethod {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "adjacent" => Ok(FillMethod::Linear),
            "column" | "column-mean" | "mean" => Ok(FillMethod::ColumnMean),
            other => Err(AnalyticsError::invalid_configuration(format!(
                "unsupported fill method '{other}'"
            ))),
        }
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillMethod::Linear => write!(f, "linear"),
            FillMethod::ColumnMean => write!(f, "column-mean"),
        }
    }
}

fn fill_linear(column: &[f64]) -> AnalyticsResult<Vec<f64>> {
    let known: Vec<usize> = (0..column.len()).filter(|i| !column[*i].is_nan()).collect();
    let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
        return Ok(column.to_vec());
    };
    let interp = if known.len() >= 2 {
        Some(LinearInterpolator::new(
            known.iter().map(|i| *i as f64).collect(),
            known.iter().map(|i| column[*i]).collect(),
        )?)
    } else {
        None
    };

    let mut filled = column.to_vec();
    for (i, value) in filled.iter_mut().enumerate() {
        if !value.is_nan() || i < first {
            continue;
        }
        if i > last {
            *value = column[last];
        } else if let Some(interp) = &interp {
            *value = interp.interpolate(i as f64)?;
        }
    }
    Ok(filled)
}

fn fill_column_mean(column: &[f64]) -> Vec<f64> {
    let present: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
    if present.is_empty() {
        return column.to_vec();
    }
    let mean = present.iter().sum::<f64>() / present.len() as f64;
    column
        .iter()
        .map(|v| if v.is_nan() { mean } else { *v })
        .collect()
}

fn fill_columns(columns: &[Vec<f64>], method: FillMethod) -> AnalyticsResult<Vec<Vec<f64>>> {
    columns
        .iter()
        .map(|column| match method {
            FillMethod::Linear => fill_linear(column),
            FillMethod::ColumnMean => Ok(fill_column_mean(column)),
        })
        .collect()
}

/// Returns a copy of `panel` with missing prices filled.
pub fn fill_nan(panel: &PricePanel, method: FillMethod) -> AnalyticsResult<PricePanel> {
    let missing = panel.columns().iter().flatten().filter(|p| p.is_nan()).count();
    log::debug!("filling {missing} missing prices ({method})");
    Ok(panel.with_columns(fill_columns(panel.columns(), method)?)?)
}

/// Several return series on a shared, outer-joined date index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnTable {
    /// Union of the input dates, increasing.
    pub dates: Vec<Date>,
    /// Column labels (the series names).
    pub labels: Vec<String>,
    /// One column per label, NaN where a series has no value.
    #[serde(with = "keel_core::float_serde::nested")]
    pub columns: Vec<Vec<f64>>,
}

impl ReturnTable {
    /// Outer-joins any number of series.
    pub fn from_series(series: &[&Series]) -> Self {
        let dates: Vec<Date> = series
            .iter()
            .flat_map(|s| s.dates().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns = series
            .iter()
            .map(|s| dates.iter().map(|d| s.get(*d).unwrap_or(f64::NAN)).collect())
            .collect();
        Self {
            dates,
            labels: series.iter().map(|s| s.name().to_string()).collect(),
            columns,
        }
    }

    /// Number of dates.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.dates.len()
    }

    /// Column for a label.
    #[must_use]
    pub fn column(&self, label: &str) -> Option<&[f64]> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|j| self.columns[j].as_slice())
    }

    /// Returns a copy with missing values filled.
    pub fn filled(&self, method: FillMethod) -> AnalyticsResult<Self> {
        Ok(Self {
            dates: self.dates.clone(),
            labels: self.labels.clone(),
            columns: fill_columns(&self.columns, method)?,
        })
    }
}

/// Places `right` next to `left`, joining on dates.
pub fn concatenate_returns(left: &Series, right: &Series) -> ReturnTable {
    ReturnTable::from_series(&[left, right])
}
