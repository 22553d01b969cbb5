//! Covariance and correlation matrices over column samples.

use nalgebra::DMatrix;

use crate::error::{MathError, MathResult};
use crate::statistics::covariance;

fn check_columns(columns: &[&[f64]]) -> MathResult<usize> {
    let Some(first) = columns.first() else {
        return Err(MathError::insufficient_data(1, 0));
    };
    let n = first.len();
    if let Some(bad) = columns.iter().find(|c| c.len() != n) {
        return Err(MathError::LengthMismatch {
            left: n,
            right: bad.len(),
        });
    }
    Ok(n)
}

/// Pairwise covariance of equally long columns.
///
/// Entry `(i, j)` is the covariance of `columns[i]` and `columns[j]`.
pub fn covariance_matrix(columns: &[&[f64]], ddof: usize) -> MathResult<DMatrix<f64>> {
    check_columns(columns)?;
    let k = columns.len();
    let mut m = DMatrix::zeros(k, k);
    for i in 0..k {
        for j in i..k {
            let c = covariance(columns[i], columns[j], ddof)?;
            m[(i, j)] = c;
            m[(j, i)] = c;
        }
    }
    Ok(m)
}

/// Pearson correlation of equally long columns.
///
/// The diagonal is exactly 1. A constant column has no defined
/// correlation and yields `ZeroVariance`.
pub fn correlation_matrix(columns: &[&[f64]]) -> MathResult<DMatrix<f64>> {
    let cov = covariance_matrix(columns, 1)?;
    let k = cov.nrows();
    for i in 0..k {
        if cov[(i, i)] == 0.0 {
            return Err(MathError::zero_variance(format!("column {i}")));
        }
    }
    Ok(DMatrix::from_fn(k, k, |i, j| {
        if i == j {
            1.0
        } else {
            cov[(i, j)] / (cov[(i, i)] * cov[(j, j)]).sqrt()
        }
    }))
}

/// Rounds every entry half away from zero to `decimals` places.
#[must_use]
pub fn round_matrix(m: &DMatrix<f64>, decimals: u32) -> DMatrix<f64> {
    let factor = 10f64.powi(decimals as i32);
    m.map(|v| (v * factor).round() / factor)
}
