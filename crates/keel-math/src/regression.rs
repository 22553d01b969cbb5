//! Ordinary least squares with a single regressor.

use serde::{Deserialize, Serialize};

use crate::error::{MathError, MathResult};

/// Result of fitting `y = alpha + beta * x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Intercept.
    pub alpha: f64,
    /// Slope.
    pub beta: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Number of `(x, y)` pairs used.
    pub observations: usize,
}

impl LinearFit {
    /// Fitted value at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.alpha + self.beta * x
    }
}

/// Fits `y = alpha + beta * x` by least squares.
///
/// R² is `1 - SS_res / SS_tot`; when `y` is constant it is 1 for a perfect
/// fit and 0 otherwise.
///
/// # Errors
///
/// - `LengthMismatch` if `x` and `y` differ in length
/// - `InsufficientData` for fewer than two pairs
/// - `ZeroVariance` if `x` is constant
///
/// # Example
///
/// ```rust
/// use keel_math::regression::ols;
///
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [3.0, 5.0, 7.0, 9.0];
/// let fit = ols(&x, &y).unwrap();
/// assert!((fit.beta - 2.0).abs() < 1e-12);
/// assert!((fit.alpha - 1.0).abs() < 1e-12);
/// ```
pub fn ols(x: &[f64], y: &[f64]) -> MathResult<LinearFit> {
    if x.len() != y.len() {
        return Err(MathError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(MathError::insufficient_data(2, n));
    }

    let nf = n as f64;
    let mx = x.iter().sum::<f64>() / nf;
    let my = y.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    let scale = x.iter().map(|v| v * v).sum::<f64>().max(f64::MIN_POSITIVE);
    if sxx <= f64::EPSILON * scale {
        return Err(MathError::zero_variance("regressor"));
    }

    let beta = sxy / sxx;
    let alpha = my - beta * mx;
    let ss_res: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (yi - alpha - beta * xi).powi(2))
        .sum();

    let r_squared = if syy == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / syy
    };

    Ok(LinearFit {
        alpha,
        beta,
        r_squared,
        observations: n,
    })
}
