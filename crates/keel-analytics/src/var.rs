//! Value-at-Risk.
//!
//! Probabilities here answer "how likely is a return below `value`?".
//! The analytical version fits a normal or Student-t distribution located
//! at the convention mean and scaled by the matching volatility; the
//! historical version counts observed returns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use keel_math::distributions::{std_normal_pdf, std_normal_quantile, Family, LocationScale};
use keel_math::statistics::histogram;

use crate::config::MetricConfig;
use crate::context::PortfolioContext;
use crate::error::{AnalyticsError, AnalyticsResult};

/// Supported return distributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Distribution {
    /// Normal.
    Normal,
    /// Student's t with `dof` degrees of freedom (must exceed 1).
    StudentT {
        /// Degrees of freedom.
        dof: f64,
    },
}

impl Distribution {
    /// Resolves a distribution name, taking the t degrees of freedom separately.
    ///
    /// Accepts `"normal"`, `"norm"`, `"t"` and `"student-t"` (any case).
    ///
    /// # Errors
    ///
    /// `UnsupportedDistribution` for an unknown name, `InvalidConfiguration`
    /// for a t distribution without valid degrees of freedom.
    pub fn from_name(name: &str, dof: Option<f64>) -> AnalyticsResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "normal" | "norm" | "gaussian" => Ok(Distribution::Normal),
            "t" | "student-t" | "student_t" | "studentt" => {
                let dof = dof.ok_or_else(|| {
                    AnalyticsError::invalid_configuration("student-t needs degrees of freedom")
                })?;
                Distribution::StudentT { dof }.validated()
            }
            _ => Err(AnalyticsError::UnsupportedDistribution {
                name: name.to_string(),
            }),
        }
    }

    fn validated(self) -> AnalyticsResult<Self> {
        if let Distribution::StudentT { dof } = self {
            if !(dof.is_finite() && dof > 1.0) {
                return Err(AnalyticsError::invalid_configuration(format!(
                    "student-t degrees of freedom must exceed 1, got {dof}"
                )));
            }
        }
        Ok(self)
    }

    fn family(self) -> Family {
        match self {
            Distribution::Normal => Family::Normal,
            Distribution::StudentT { dof } => Family::StudentT { dof },
        }
    }
}

impl FromStr for Distribution {
    type Err = AnalyticsError;

    /// Parses `"normal"`, or `"t:<dof>"` / `"student-t:<dof>"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((name, dof)) => {
                let dof: f64 = dof.trim().parse().map_err(|_| {
                    AnalyticsError::invalid_configuration(format!("bad degrees of freedom '{dof}'"))
                })?;
                Distribution::from_name(name, Some(dof))
            }
            None => Distribution::from_name(s, None),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Normal => write!(f, "normal"),
            Distribution::StudentT { dof } => write!(f, "t:{dof}"),
        }
    }
}

/// Analytical VaR at a return threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticalVar {
    /// Probability of a return below the threshold.
    #[serde(with = "keel_core::float_serde")]
    pub probability: f64,
    /// Expected loss in the tail below the threshold, as a positive return.
    #[serde(with = "keel_core::float_serde")]
    pub expected_loss: f64,
    /// Location used.
    #[serde(with = "keel_core::float_serde")]
    pub mean: f64,
    /// Scale used.
    #[serde(with = "keel_core::float_serde")]
    pub scale: f64,
    /// Distribution used.
    pub distribution: Distribution,
}

fn fitted(
    ctx: &PortfolioContext,
    distribution: Distribution,
    config: &MetricConfig,
) -> AnalyticsResult<LocationScale> {
    let distribution = distribution.validated()?;
    let convention = config.mean_convention()?;
    Ok(LocationScale::new(
        distribution.family(),
        ctx.mean_for(convention),
        ctx.volatility_for(convention),
    )?)
}

/// Tail conditional expectation of the loss at tail probability `alpha`.
fn expected_loss(distribution: Distribution, mean: f64, scale: f64, alpha: f64) -> AnalyticsResult<f64> {
    if alpha == 0.0 {
        return Err(AnalyticsError::division_by_zero("expected loss at zero tail probability"));
    }
    if alpha >= 1.0 {
        // the whole distribution is in the tail
        return Ok(-mean);
    }
    let tail = match distribution {
        Distribution::Normal => std_normal_pdf(std_normal_quantile(alpha)) / alpha,
        Distribution::StudentT { dof } => {
            let standard = LocationScale::new(Family::StudentT { dof }, 0.0, 1.0)?;
            let t = standard.quantile(alpha)?;
            (dof + t * t) / (dof - 1.0) * standard.pdf(t) / alpha
        }
    };
    Ok(scale * tail - mean)
}

/// Analytical VaR at `value`.
///
/// The distribution is located at the config's convention mean and
/// scaled by the annual volatility for annual conventions, the
/// per-period volatility otherwise.
///
/// # Errors
///
/// `InvalidConfiguration` for `dof ≤ 1`, `DivisionByZero` when the
/// threshold has zero probability.
pub fn analytical_var(
    ctx: &PortfolioContext,
    value: f64,
    distribution: Distribution,
    config: &MetricConfig,
) -> AnalyticsResult<AnalyticalVar> {
    let dist = fitted(ctx, distribution, config)?;
    let probability = dist.cdf(value);
    Ok(AnalyticalVar {
        probability,
        expected_loss: expected_loss(distribution, dist.location(), dist.scale(), probability)?,
        mean: dist.location(),
        scale: dist.scale(),
        distribution,
    })
}

/// Fraction of returns strictly below `value`.
#[must_use]
pub fn historical_var(ctx: &PortfolioContext, value: f64) -> f64 {
    let returns = ctx.returns().values();
    let below = returns.iter().filter(|r| **r < value).count();
    below as f64 / returns.len() as f64
}

/// Density of the fitted distribution around its mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarCurve {
    /// Evenly spaced returns over `mean ± z × scale`.
    #[serde(with = "keel_core::float_serde::vec")]
    pub x: Vec<f64>,
    /// Density at each `x`.
    #[serde(with = "keel_core::float_serde::vec")]
    pub density: Vec<f64>,
    /// Index of the `x` closest to the threshold.
    pub cutoff: usize,
}

/// Samples the fitted density at `points` returns within `z` scales of the mean.
pub fn analytical_var_curve(
    ctx: &PortfolioContext,
    value: f64,
    distribution: Distribution,
    config: &MetricConfig,
    z: f64,
    points: usize,
) -> AnalyticsResult<VarCurve> {
    if points < 2 {
        return Err(AnalyticsError::invalid_configuration("VaR curve needs at least 2 points"));
    }
    if !(z.is_finite() && z > 0.0) {
        return Err(AnalyticsError::invalid_configuration(format!(
            "VaR curve width must be positive, got {z}"
        )));
    }
    let dist = fitted(ctx, distribution, config)?;
    let lo = dist.location() - z * dist.scale();
    let step = 2.0 * z * dist.scale() / (points - 1) as f64;
    let x: Vec<f64> = (0..points).map(|i| lo + step * i as f64).collect();
    let density = x.iter().map(|v| dist.pdf(*v)).collect();
    let cutoff = x
        .iter()
        .enumerate()
        .min_by(|a, b| (a.1 - value).abs().total_cmp(&(b.1 - value).abs()))
        .map_or(0, |(i, _)| i);
    Ok(VarCurve { x, density, cutoff })
}

/// Histogram of observed returns with the VaR threshold marked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarHistogram {
    /// `bins + 1` bin edges.
    #[serde(with = "keel_core::float_serde::vec")]
    pub edges: Vec<f64>,
    /// Returns per bin.
    pub counts: Vec<usize>,
    /// Number of leading bins lying entirely at or below the threshold.
    pub cutoff_bin: usize,
}

/// Bins the portfolio returns.
pub fn historical_var_histogram(
    ctx: &PortfolioContext,
    value: f64,
    bins: usize,
) -> AnalyticsResult<VarHistogram> {
    let (edges, counts) = histogram(ctx.returns().values(), bins)?;
    let cutoff_bin = edges[1..].iter().take_while(|upper| **upper <= value).count();
    Ok(VarHistogram {
        edges,
        counts,
        cutoff_bin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context_from_returns;
    use approx::assert_relative_eq;
    use keel_math::distributions::std_normal_cdf;

    fn sample() -> PortfolioContext {
        context_from_returns(&[0.01, -0.02, 0.015, -0.005, 0.02, -0.01, 0.004, -0.001])
    }

    #[test]
    fn test_distribution_names() {
        assert_eq!(Distribution::from_name("Normal", None).unwrap(), Distribution::Normal);
        assert_eq!(Distribution::from_name("norm", None).unwrap(), Distribution::Normal);
        assert_eq!(
            Distribution::from_name("student-t", Some(5.0)).unwrap(),
            Distribution::StudentT { dof: 5.0 }
        );
        assert_eq!("t:4".parse::<Distribution>().unwrap(), Distribution::StudentT { dof: 4.0 });
        assert!(matches!(
            Distribution::from_name("t", None),
            Err(AnalyticsError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            Distribution::from_name("t", Some(1.0)),
            Err(AnalyticsError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            "cauchy".parse::<Distribution>(),
            Err(AnalyticsError::UnsupportedDistribution { .. })
        ));
        assert_eq!(Distribution::StudentT { dof: 3.0 }.to_string(), "t:3");
    }

    #[test]
    fn test_analytical_var_normal() {
        let ctx = sample();
        let config = MetricConfig::per_period();
        let mu = ctx.mean();
        let sigma = ctx.volatility();
        let value = mu - sigma;

        let var = analytical_var(&ctx, value, Distribution::Normal, &config).unwrap();
        let alpha = std_normal_cdf(-1.0);
        assert_relative_eq!(var.probability, alpha, epsilon = 1e-9);
        // φ(z_α) = φ(-1)
        let expected = sigma * std_normal_pdf(-1.0) / alpha - mu;
        assert_relative_eq!(var.expected_loss, expected, epsilon = 1e-6);
        assert!(var.expected_loss > -value);
    }

    #[test]
    fn test_analytical_var_uses_annual_scale() {
        let ctx = sample();
        let config = MetricConfig::new();
        let var = analytical_var(&ctx, 0.0, Distribution::Normal, &config).unwrap();
        assert_eq!(var.mean, ctx.geometric_mean());
        assert_eq!(var.scale, ctx.annual_volatility());
    }

    #[test]
    fn test_student_t_tail_is_heavier() {
        let ctx = sample();
        let config = MetricConfig::per_period();
        let value = ctx.mean() - 3.0 * ctx.volatility();
        let normal = analytical_var(&ctx, value, Distribution::Normal, &config).unwrap();
        let t = analytical_var(&ctx, value, Distribution::StudentT { dof: 4.0 }, &config).unwrap();
        assert!(t.probability > normal.probability);
        assert!(t.expected_loss > 0.0);
    }

    #[test]
    fn test_expected_loss_edges() {
        assert!(matches!(
            expected_loss(Distribution::Normal, 0.0, 1.0, 0.0),
            Err(AnalyticsError::DivisionByZero { .. })
        ));
        assert_eq!(expected_loss(Distribution::Normal, 0.01, 1.0, 1.0).unwrap(), -0.01);
    }

    #[test]
    fn test_historical_var() {
        let mut returns = vec![0.01; 17];
        returns.extend([-0.06, -0.07, -0.08]);
        let ctx = context_from_returns(&returns);
        assert_relative_eq!(historical_var(&ctx, -0.05), 0.15, epsilon = 1e-12);
        assert_eq!(historical_var(&ctx, -0.5), 0.0);
    }

    #[test]
    fn test_var_curve() {
        let ctx = sample();
        let config = MetricConfig::per_period();
        let curve =
            analytical_var_curve(&ctx, ctx.mean(), Distribution::Normal, &config, 3.0, 101).unwrap();
        assert_eq!(curve.x.len(), 101);
        assert_eq!(curve.cutoff, 50);
        let peak = curve.density[50];
        assert!(curve.density.iter().all(|d| *d <= peak + 1e-12));
        assert!(analytical_var_curve(&ctx, 0.0, Distribution::Normal, &config, 3.0, 1).is_err());
    }

    #[test]
    fn test_var_histogram() {
        let ctx = sample();
        let hist = historical_var_histogram(&ctx, 0.0, 4).unwrap();
        assert_eq!(hist.counts.iter().sum::<usize>(), 8);
        assert_eq!(hist.edges.len(), 5);
        // returns span [-0.02, 0.02], so the first two bins end at or below 0
        assert_eq!(hist.cutoff_bin, 2);
    }
}
