//! Goodness-of-fit tests for normality.
//!
//! Every test takes a raw sample and returns a [`NormalityStatistic`]:
//! the test statistic, its p-value and, where the test is usually read
//! off a table, critical values.
//!
//! | Test | Statistic | Min n |
//! |------|-----------|-------|
//! | [`jarque_bera`] | JB, χ²(2) tail | 2 |
//! | [`dagostino_pearson`] | K² = Z(skew)² + Z(kurt)², χ²(2) tail | 8 |
//! | [`shapiro_wilk`] | W (Royston 1995) | 3 |
//! | [`kolmogorov_smirnov`] | D against N(0, 1) | 2 |
//! | [`lilliefors`] | D against N(mean, sd) | 3 |
//! | [`anderson_darling`] | A² against N(mean, sd) | 3 |

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::distributions::{chi_squared_sf, std_normal_cdf, std_normal_quantile, std_normal_sf};
use crate::error::{MathError, MathResult};
use crate::statistics::{excess_kurtosis, kurtosis, mean, skewness, std_dev};

/// A tabulated critical value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValue {
    /// Significance level in percent.
    pub significance: f64,
    /// Statistic value above which normality is rejected at that level.
    pub value: f64,
}

/// Outcome of a normality test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalityStatistic {
    /// Test statistic.
    pub statistic: f64,
    /// Probability of a statistic at least this extreme under normality.
    pub p_value: f64,
    /// Critical values, empty for tests that report only a p-value.
    pub critical_values: Vec<CriticalValue>,
}

impl NormalityStatistic {
    fn new(statistic: f64, p_value: f64) -> Self {
        Self {
            statistic,
            p_value,
            critical_values: Vec::new(),
        }
    }
}

fn sorted_sample(xs: &[f64], required: usize) -> MathResult<Vec<f64>> {
    if xs.len() < required {
        return Err(MathError::insufficient_data(required, xs.len()));
    }
    if xs.iter().any(|x| !x.is_finite()) {
        return Err(MathError::invalid_input(
            "normality tests require finite observations",
        ));
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, ci| acc * x + ci)
}

/// Jarque-Bera test from biased sample skewness and excess kurtosis.
pub fn jarque_bera(xs: &[f64]) -> MathResult<NormalityStatistic> {
    let x = sorted_sample(xs, 2)?;
    let n = x.len() as f64;
    let s = skewness(&x)?;
    let k = excess_kurtosis(&x)?;
    let jb = n / 6.0 * (s * s + k * k / 4.0);
    Ok(NormalityStatistic::new(jb, chi_squared_sf(jb, 2.0)?))
}

// D'Agostino (1970) transformation of sample skewness to a standard normal.
fn skew_z(x: &[f64]) -> MathResult<f64> {
    let n = x.len() as f64;
    let b2 = skewness(x)?;
    let y = b2 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    Ok(delta * (y / alpha).asinh())
}

// Anscombe-Glynn (1983) transformation of sample kurtosis.
fn kurtosis_z(x: &[f64]) -> MathResult<f64> {
    let n = x.len() as f64;
    let b2 = kurtosis(x)?;
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 =
        24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let z = (b2 - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0
        + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + z * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return Err(MathError::DivisionByZero { value: denom });
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    Ok((term1 - term2) / (2.0 / (9.0 * a)).sqrt())
}

/// D'Agostino-Pearson omnibus test.
pub fn dagostino_pearson(xs: &[f64]) -> MathResult<NormalityStatistic> {
    let x = sorted_sample(xs, 8)?;
    let zs = skew_z(&x)?;
    let zk = kurtosis_z(&x)?;
    let k2 = zs * zs + zk * zk;
    Ok(NormalityStatistic::new(k2, chi_squared_sf(k2, 2.0)?))
}

const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_GAMMA: [f64; 2] = [-2.273, 0.459];
const SW_MU_SMALL: [f64; 4] = [0.5440, -0.39978, 0.025054, -6.714e-4];
const SW_SIGMA_SMALL: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_MU_LARGE: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_SIGMA_LARGE: [f64; 3] = [-0.4803, -0.082676, 0.0030302];

fn shapiro_wilk_coefficients(n: usize) -> Vec<f64> {
    if n == 3 {
        return vec![-FRAC_1_SQRT_2, 0.0, FRAC_1_SQRT_2];
    }
    let nf = n as f64;
    let m: Vec<f64> = (1..=n)
        .map(|i| std_normal_quantile((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let mm: f64 = m.iter().map(|v| v * v).sum();
    let u = 1.0 / nf.sqrt();

    let mut a = vec![0.0; n];
    let an = poly(&SW_C1, u) + m[n - 1] / mm.sqrt();
    a[n - 1] = an;
    a[0] = -an;

    if n > 5 {
        let an1 = poly(&SW_C2, u) + m[n - 2] / mm.sqrt();
        let phi = (mm - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
            / (1.0 - 2.0 * an * an - 2.0 * an1 * an1);
        a[n - 2] = an1;
        a[1] = -an1;
        for i in 2..n - 2 {
            a[i] = m[i] / phi.sqrt();
        }
    } else {
        let phi = (mm - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * an * an);
        for i in 1..n - 1 {
            a[i] = m[i] / phi.sqrt();
        }
    }
    a
}

fn shapiro_wilk_p_value(w: f64, n: usize) -> f64 {
    if n == 3 {
        let p = 6.0 / PI * (w.sqrt().asin() - 0.75f64.sqrt().asin());
        return p.clamp(0.0, 1.0);
    }
    let nf = n as f64;
    let y = (1.0 - w).ln();
    if n <= 11 {
        let gamma = poly(&SW_GAMMA, nf);
        if y >= gamma {
            return 0.0;
        }
        let y = -(gamma - y).ln();
        let mu = poly(&SW_MU_SMALL, nf);
        let sigma = poly(&SW_SIGMA_SMALL, nf).exp();
        std_normal_sf((y - mu) / sigma)
    } else {
        let ln_n = nf.ln();
        let mu = poly(&SW_MU_LARGE, ln_n);
        let sigma = poly(&SW_SIGMA_LARGE, ln_n).exp();
        std_normal_sf((y - mu) / sigma)
    }
}

/// Shapiro-Wilk W test with Royston's approximation for the coefficients
/// and the p-value.
pub fn shapiro_wilk(xs: &[f64]) -> MathResult<NormalityStatistic> {
    let x = sorted_sample(xs, 3)?;
    let n = x.len();
    if n > 5000 {
        log::warn!("shapiro-wilk p-value may be inaccurate for n = {n} > 5000");
    }

    let m = mean(&x)?;
    let ss: f64 = x.iter().map(|v| (v - m).powi(2)).sum();
    if ss <= 0.0 {
        return Err(MathError::zero_variance("shapiro-wilk sample"));
    }

    let a = shapiro_wilk_coefficients(n);
    let num: f64 = a.iter().zip(&x).map(|(ai, xi)| ai * xi).sum();
    let mut w = (num * num / ss).min(1.0);
    if n == 3 {
        w = w.max(0.75);
    }
    Ok(NormalityStatistic::new(w, shapiro_wilk_p_value(w, n)))
}

// Largest distance between the empirical CDF of a sorted sample and `cdf`.
fn ks_distance(sorted: &[f64], cdf: impl Fn(f64) -> f64) -> f64 {
    let n = sorted.len() as f64;
    sorted
        .iter()
        .enumerate()
        .map(|(i, x)| {
            let f = cdf(*x);
            let above = (i as f64 + 1.0) / n - f;
            let below = f - i as f64 / n;
            above.max(below)
        })
        .fold(0.0, f64::max)
}

// Kolmogorov distribution tail, Q(λ) = 2 Σ (-1)^(k-1) exp(-2 k² λ²).
fn kolmogorov_q(lambda: f64) -> f64 {
    let a2 = -2.0 * lambda * lambda;
    let mut fac = 2.0;
    let mut sum = 0.0;
    let mut previous = 0.0;
    for k in 1..=100 {
        let kf = f64::from(k);
        let term = fac * (a2 * kf * kf).exp();
        sum += term;
        if term.abs() <= 0.001 * previous || term.abs() <= 1e-8 * sum {
            return sum.clamp(0.0, 1.0);
        }
        fac = -fac;
        previous = term.abs();
    }
    1.0
}

/// One-sample Kolmogorov-Smirnov test against the standard normal.
///
/// The sample is not standardised; returns that are not already on a unit
/// scale will be rejected. Use [`lilliefors`] to test normality with
/// estimated parameters.
pub fn kolmogorov_smirnov(xs: &[f64]) -> MathResult<NormalityStatistic> {
    let x = sorted_sample(xs, 2)?;
    let d = ks_distance(&x, std_normal_cdf);
    let sqrt_n = (x.len() as f64).sqrt();
    let p = kolmogorov_q((sqrt_n + 0.12 + 0.11 / sqrt_n) * d);
    Ok(NormalityStatistic::new(d, p))
}

fn standardized(x: &[f64], what: &str) -> MathResult<Vec<f64>> {
    let m = mean(x)?;
    let sd = std_dev(x, 1)?;
    if sd == 0.0 {
        return Err(MathError::zero_variance(what));
    }
    Ok(x.iter().map(|v| (v - m) / sd).collect())
}

/// Lilliefors test: Kolmogorov-Smirnov with mean and standard deviation
/// estimated from the sample.
///
/// The p-value uses the Dallal-Wilkinson (1986) approximation, which is
/// accurate for small p-values and clipped to `[0, 1]`.
pub fn lilliefors(xs: &[f64]) -> MathResult<NormalityStatistic> {
    let x = sorted_sample(xs, 3)?;
    let z = standardized(&x, "lilliefors sample")?;
    let d = ks_distance(&z, std_normal_cdf);

    let n = z.len() as f64;
    let (kd, nd) = if n > 100.0 {
        (d * (n / 100.0).powf(0.49), 100.0)
    } else {
        (d, n)
    };
    let p = (-7.01256 * kd * kd * (nd + 2.78019) + 2.99587 * kd * (nd + 2.78019).sqrt()
        - 0.122119
        + 0.974598 / nd.sqrt()
        + 1.67997 / nd)
        .exp();
    Ok(NormalityStatistic::new(d, p.clamp(0.0, 1.0)))
}

const AD_SIGNIFICANCE: [f64; 5] = [15.0, 10.0, 5.0, 2.5, 1.0];
const AD_CRITICAL: [f64; 5] = [0.576, 0.656, 0.787, 0.918, 1.092];

/// Anderson-Darling test with estimated mean and standard deviation.
///
/// Reports the unadjusted A² together with critical values at the 15, 10,
/// 5, 2.5 and 1 percent levels. The p-value applies the D'Agostino-Stephens
/// small-sample correction.
pub fn anderson_darling(xs: &[f64]) -> MathResult<NormalityStatistic> {
    let x = sorted_sample(xs, 3)?;
    let z = standardized(&x, "anderson-darling sample")?;
    let n = z.len();
    let nf = n as f64;

    let s: f64 = (0..n)
        .map(|i| {
            let ln_cdf = std_normal_cdf(z[i]).max(f64::MIN_POSITIVE).ln();
            let ln_sf = std_normal_sf(z[n - 1 - i]).max(f64::MIN_POSITIVE).ln();
            (2.0 * i as f64 + 1.0) * (ln_cdf + ln_sf)
        })
        .sum();
    let a2 = -nf - s / nf;

    let adjusted = a2 * (1.0 + 0.75 / nf + 2.25 / (nf * nf));
    let p = if adjusted >= 0.6 {
        (1.2937 - 5.709 * adjusted + 0.0186 * adjusted * adjusted).exp()
    } else if adjusted >= 0.34 {
        (0.9177 - 4.279 * adjusted - 1.38 * adjusted * adjusted).exp()
    } else if adjusted >= 0.2 {
        1.0 - (-8.318 + 42.796 * adjusted - 59.938 * adjusted * adjusted).exp()
    } else {
        1.0 - (-13.436 + 101.14 * adjusted - 223.73 * adjusted * adjusted).exp()
    };

    let divisor = 1.0 + 4.0 / nf - 25.0 / (nf * nf);
    let critical_values = AD_SIGNIFICANCE
        .iter()
        .zip(AD_CRITICAL)
        .map(|(significance, value)| CriticalValue {
            significance: *significance,
            value: value / divisor,
        })
        .collect();

    Ok(NormalityStatistic {
        statistic: a2,
        p_value: p.clamp(0.0, 1.0),
        critical_values,
    })
}
