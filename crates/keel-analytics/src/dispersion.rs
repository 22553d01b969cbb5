//! Covariance and correlation of the asset returns.

use nalgebra::DMatrix;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use keel_core::float_serde;
use keel_math::matrix;

use crate::context::PortfolioContext;
use crate::error::{AnalyticsError, AnalyticsResult};

/// Default number of decimals kept in matrix output.
pub const DEFAULT_DECIMALS: u32 = 5;

/// A square matrix with one label per row and column.
///
/// Serialized as the labels plus row-major `values`; NaN entries survive
/// a JSON round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledMatrix {
    /// Row and column labels, in order.
    pub labels: Vec<String>,
    /// Matrix entries.
    #[serde(serialize_with = "serialize_rows")]
    pub values: DMatrix<f64>,
}

fn serialize_rows<S: Serializer>(values: &DMatrix<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    let rows: Vec<Vec<f64>> = values
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect();
    float_serde::nested::serialize(&rows, serializer)
}

impl<'de> Deserialize<'de> for LabeledMatrix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct LabeledMatrixData {
            labels: Vec<String>,
            #[serde(with = "keel_core::float_serde::nested")]
            values: Vec<Vec<f64>>,
        }

        let data = LabeledMatrixData::deserialize(deserializer)?;
        let n = data.labels.len();
        if data.values.len() != n || data.values.iter().any(|row| row.len() != n) {
            return Err(serde::de::Error::custom(format!(
                "matrix entries must be {n} x {n} to match the labels"
            )));
        }
        Ok(LabeledMatrix {
            labels: data.labels,
            values: DMatrix::from_row_iterator(n, n, data.values.into_iter().flatten()),
        })
    }
}

impl LabeledMatrix {
    /// Entry for a pair of labels.
    #[must_use]
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == row)?;
        let j = self.labels.iter().position(|l| l == col)?;
        Some(self.values[(i, j)])
    }

    /// Row-major rows, for tabular output.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.values
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

fn columns(ctx: &PortfolioContext) -> AnalyticsResult<Vec<&[f64]>> {
    let returns = ctx.asset_returns();
    if returns.len() < 2 {
        return Err(AnalyticsError::insufficient_data(
            "asset return matrix",
            2,
            returns.len(),
        ));
    }
    Ok(returns.columns().iter().map(Vec::as_slice).collect())
}

/// Sample covariance of the asset returns.
///
/// With `annual`, entries are multiplied by the context frequency before
/// rounding to `decimals` places.
pub fn covariance_matrix(
    ctx: &PortfolioContext,
    annual: bool,
    decimals: u32,
) -> AnalyticsResult<LabeledMatrix> {
    let mut values = matrix::covariance_matrix(&columns(ctx)?, 1)?;
    if annual {
        values *= ctx.periods_per_year();
    }
    Ok(LabeledMatrix {
        labels: ctx.asset_returns().tickers().to_vec(),
        values: matrix::round_matrix(&values, decimals),
    })
}

/// Pearson correlation of the asset returns, rounded to `decimals` places.
///
/// # Errors
///
/// `ZeroVariance` when an asset's price never moves.
pub fn correlation_matrix(ctx: &PortfolioContext, decimals: u32) -> AnalyticsResult<LabeledMatrix> {
    let values = matrix::correlation_matrix(&columns(ctx)?)?;
    Ok(LabeledMatrix {
        labels: ctx.asset_returns().tickers().to_vec(),
        values: matrix::round_matrix(&values, decimals),
    })
}
