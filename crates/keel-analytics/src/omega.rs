//! Omega ratio and Omega curve.
//!
//! Omega at threshold `τ` is the sum of the returns' gains above `τ` over
//! the sum of their shortfalls at or below it. It uses the whole return
//! distribution, so it needs no normality assumption.

use serde::{Deserialize, Serialize};

use keel_core::rates::to_period_rate;

use crate::config::{ComputeConfig, MetricConfig};
use crate::context::PortfolioContext;
use crate::downside::excess_over;
use crate::error::{checked_div, AnalyticsError, AnalyticsResult};
use crate::parallel::maybe_parallel_map;

/// Omega ratio against the config's MAR converted to a per-period rate.
pub fn omega_ratio(ctx: &PortfolioContext, config: &MetricConfig) -> AnalyticsResult<f64> {
    omega_ratio_at(ctx, config.period_mar(ctx.periods_per_year())?)
}

/// Omega ratio against a per-period threshold.
///
/// # Errors
///
/// `DivisionByZero` when no return is at or below the threshold
/// (or every such return equals it).
pub fn omega_ratio_at(ctx: &PortfolioContext, period_threshold: f64) -> AnalyticsResult<f64> {
    let excess = excess_over(ctx.returns().values(), period_threshold);
    let winning: f64 = excess.iter().filter(|x| **x > 0.0).sum();
    let losing: f64 = -excess.iter().filter(|x| **x <= 0.0).sum::<f64>();
    checked_div(winning, losing, "omega ratio")
}

/// Most points a [`MarSweep`] may produce.
pub const MAX_SWEEP_POINTS: usize = 100_000;

/// An inclusive sweep of annual MAR values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarSweep {
    /// First annual MAR.
    pub lower: f64,
    /// Last annual MAR.
    pub upper: f64,
    /// Increment between points.
    pub step: f64,
}

impl Default for MarSweep {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 0.2,
            step: 0.01,
        }
    }
}

impl MarSweep {
    /// Creates a sweep.
    #[must_use]
    pub fn new(lower: f64, upper: f64, step: f64) -> Self {
        Self { lower, upper, step }
    }

    /// The annual MAR values, `lower` and `upper` included.
    pub fn values(&self) -> AnalyticsResult<Vec<f64>> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(AnalyticsError::invalid_configuration(format!(
                "MAR sweep step must be positive, got {}",
                self.step
            )));
        }
        if !(self.lower.is_finite() && self.upper.is_finite()) || self.upper < self.lower {
            return Err(AnalyticsError::invalid_configuration(format!(
                "MAR sweep bounds [{}, {}] are not ordered",
                self.lower, self.upper
            )));
        }
        let steps = ((self.upper - self.lower) / self.step).round();
        if !(steps < MAX_SWEEP_POINTS as f64) {
            return Err(AnalyticsError::invalid_configuration(format!(
                "MAR sweep [{}, {}] with step {} exceeds {MAX_SWEEP_POINTS} points",
                self.lower, self.upper, self.step
            )));
        }
        let count = steps as usize + 1;
        Ok((0..count)
            .map(|i| self.lower + self.step * i as f64)
            .collect())
    }
}

/// One point on an Omega curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OmegaPoint {
    /// Annual MAR.
    #[serde(with = "keel_core::float_serde")]
    pub annual_mar: f64,
    /// Omega at that MAR.
    #[serde(with = "keel_core::float_serde")]
    pub omega: f64,
}

/// Omega as a function of the annual MAR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmegaCurve {
    /// Points in increasing MAR order.
    pub points: Vec<OmegaPoint>,
}

impl OmegaCurve {
    /// MAR values.
    #[must_use]
    pub fn mars(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.annual_mar).collect()
    }

    /// Omega values.
    #[must_use]
    pub fn omegas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.omega).collect()
    }
}

/// Evaluates Omega at every MAR of the sweep.
///
/// # Errors
///
/// Fails if the sweep is malformed or Omega is undefined at any point.
pub fn omega_curve(
    ctx: &PortfolioContext,
    sweep: &MarSweep,
    compute: &ComputeConfig,
) -> AnalyticsResult<OmegaCurve> {
    let frequency = ctx.periods_per_year();
    let mars = sweep.values()?;
    let points = maybe_parallel_map(&mars, compute, |annual_mar| -> AnalyticsResult<OmegaPoint> {
        let threshold = to_period_rate(*annual_mar, frequency)?;
        Ok(OmegaPoint {
            annual_mar: *annual_mar,
            omega: omega_ratio_at(ctx, threshold)?,
        })
    })
    .into_iter()
    .collect::<AnalyticsResult<Vec<_>>>()?;
    Ok(OmegaCurve { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context_from_returns;
    use approx::assert_relative_eq;

    #[test]
    fn test_omega_ratio_at() {
        let ctx = context_from_returns(&[0.02, -0.01, 0.03, -0.04]);
        // gains 0.05, losses 0.05
        assert_relative_eq!(omega_ratio_at(&ctx, 0.0).unwrap(), 1.0, epsilon = 1e-9);
        // gains 0.01 + 0.02, losses 0.02 + 0.05
        assert_relative_eq!(omega_ratio_at(&ctx, 0.01).unwrap(), 0.03 / 0.07, epsilon = 1e-9);
    }

    #[test]
    fn test_omega_without_losses() {
        let ctx = context_from_returns(&[0.02, 0.01, 0.03]);
        assert!(matches!(
            omega_ratio_at(&ctx, 0.0),
            Err(AnalyticsError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_omega_ratio_uses_period_mar() {
        let ctx = context_from_returns(&[0.02, -0.01, 0.03, -0.04]);
        let config = MetricConfig::new().with_mar(0.05);
        let threshold = to_period_rate(0.05, 252.0).unwrap();
        assert_relative_eq!(
            omega_ratio(&ctx, &config).unwrap(),
            omega_ratio_at(&ctx, threshold).unwrap()
        );
    }

    #[test]
    fn test_default_sweep() {
        let mars = MarSweep::default().values().unwrap();
        assert_eq!(mars.len(), 21);
        assert_eq!(mars[0], 0.0);
        assert_relative_eq!(mars[20], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_bad_sweep() {
        assert!(MarSweep::new(0.0, 0.2, 0.0).values().is_err());
        assert!(MarSweep::new(0.2, 0.0, 0.01).values().is_err());
        assert_eq!(MarSweep::new(0.05, 0.05, 0.01).values().unwrap(), vec![0.05]);
    }

    #[test]
    fn test_sweep_point_cap() {
        for step in [1e-12, 1e-300, f64::MIN_POSITIVE] {
            assert!(matches!(
                MarSweep::new(0.0, 0.2, step).values(),
                Err(AnalyticsError::InvalidConfiguration { .. })
            ));
        }
        assert!(MarSweep::new(-1e308, 1e308, 1.0).values().is_err());
        let largest = MarSweep::new(0.0, (MAX_SWEEP_POINTS - 1) as f64, 1.0).values().unwrap();
        assert_eq!(largest.len(), MAX_SWEEP_POINTS);
    }

    #[test]
    fn test_omega_curve_non_increasing() {
        let ctx = context_from_returns(&[0.002, -0.001, 0.003, -0.004, 0.0015, -0.0005, 0.001]);
        let curve = omega_curve(&ctx, &MarSweep::default(), &ComputeConfig::sequential()).unwrap();
        assert_eq!(curve.points.len(), 21);
        for pair in curve.omegas().windows(2) {
            assert!(pair[1] <= pair[0] + 1e-12);
        }
    }
}
