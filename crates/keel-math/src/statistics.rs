//! Descriptive statistics on `f64` slices.
//!
//! Missing values (NaN) are not skipped: they propagate into the result,
//! so callers that want gap-free statistics must clean their data first.

use crate::error::{MathError, MathResult};

/// Arithmetic mean.
pub fn mean(xs: &[f64]) -> MathResult<f64> {
    if xs.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    Ok(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom (`ddof = 1` for the sample variance).
pub fn variance(xs: &[f64], ddof: usize) -> MathResult<f64> {
    if xs.len() <= ddof {
        return Err(MathError::insufficient_data(ddof + 1, xs.len()));
    }
    let m = mean(xs)?;
    let ss: f64 = xs.iter().map(|x| (x - m).powi(2)).sum();
    Ok(ss / (xs.len() - ddof) as f64)
}

/// Standard deviation with `ddof` delta degrees of freedom.
pub fn std_dev(xs: &[f64], ddof: usize) -> MathResult<f64> {
    variance(xs, ddof).map(f64::sqrt)
}

/// Covariance of two equally long samples.
pub fn covariance(xs: &[f64], ys: &[f64], ddof: usize) -> MathResult<f64> {
    if xs.len() != ys.len() {
        return Err(MathError::LengthMismatch {
            left: xs.len(),
            right: ys.len(),
        });
    }
    if xs.len() <= ddof {
        return Err(MathError::insufficient_data(ddof + 1, xs.len()));
    }
    let mx = mean(xs)?;
    let my = mean(ys)?;
    let s: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
    Ok(s / (xs.len() - ddof) as f64)
}

/// Biased `k`-th central moment, `(1/n) Σ (x - mean)^k`.
pub fn central_moment(xs: &[f64], k: i32) -> MathResult<f64> {
    let m = mean(xs)?;
    Ok(xs.iter().map(|x| (x - m).powi(k)).sum::<f64>() / xs.len() as f64)
}

/// Biased sample skewness, `m3 / m2^(3/2)`.
pub fn skewness(xs: &[f64]) -> MathResult<f64> {
    let m2 = central_moment(xs, 2)?;
    if m2 == 0.0 {
        return Err(MathError::zero_variance("skewness input"));
    }
    Ok(central_moment(xs, 3)? / m2.powf(1.5))
}

/// Biased sample kurtosis, `m4 / m2²` (normal = 3).
pub fn kurtosis(xs: &[f64]) -> MathResult<f64> {
    let m2 = central_moment(xs, 2)?;
    if m2 == 0.0 {
        return Err(MathError::zero_variance("kurtosis input"));
    }
    Ok(central_moment(xs, 4)? / (m2 * m2))
}

/// Excess kurtosis (normal = 0).
pub fn excess_kurtosis(xs: &[f64]) -> MathResult<f64> {
    kurtosis(xs).map(|k| k - 3.0)
}

/// Smallest value, NaN if any value is NaN.
pub fn min(xs: &[f64]) -> MathResult<f64> {
    if xs.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    Ok(xs.iter().copied().fold(f64::INFINITY, |acc, x| {
        if x.is_nan() || acc.is_nan() {
            f64::NAN
        } else {
            acc.min(x)
        }
    }))
}

/// Largest value, NaN if any value is NaN.
pub fn max(xs: &[f64]) -> MathResult<f64> {
    if xs.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }
    Ok(xs.iter().copied().fold(f64::NEG_INFINITY, |acc, x| {
        if x.is_nan() || acc.is_nan() {
            f64::NAN
        } else {
            acc.max(x)
        }
    }))
}

/// Equal-width histogram.
///
/// Returns `bins + 1` edges spanning `[min, max]` and `bins` counts. The
/// last bin is closed on the right. A constant sample is binned over
/// `[x - 0.5, x + 0.5]`.
pub fn histogram(xs: &[f64], bins: usize) -> MathResult<(Vec<f64>, Vec<usize>)> {
    if bins == 0 {
        return Err(MathError::invalid_input("histogram needs at least one bin"));
    }
    let finite: Vec<f64> = xs.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.is_empty() {
        return Err(MathError::insufficient_data(1, 0));
    }

    let (mut lo, mut hi) = (min(&finite)?, max(&finite)?);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for x in finite {
        let idx = (((x - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Ok((edges, counts))
}
