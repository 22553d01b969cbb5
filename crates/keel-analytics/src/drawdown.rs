//! Drawdowns and drawdown-based ratios.
//!
//! Lookback windows count observations of the value path, newest last.
//! A window longer than the available history is shortened to the
//! history, logged at `warn`, and reported through [`LookbackWindow`].

use serde::{Deserialize, Serialize};

use keel_core::{Date, Series};

use crate::config::MetricConfig;
use crate::context::PortfolioContext;
use crate::error::{checked_div, AnalyticsError, AnalyticsResult};

/// Default trailing window for maximum drawdown and Calmar.
pub const DEFAULT_DRAWDOWN_PERIOD: usize = 1000;

/// Default number of drawdowns averaged by the Sterling ratio.
pub const DEFAULT_STERLING_DRAWDOWNS: usize = 3;

/// Starting value of the wealth index behind [`drawdowns`].
const WEALTH_BASE: f64 = 1000.0;

/// The lookback actually used for a windowed statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookbackWindow {
    /// Observations asked for.
    pub requested: usize,
    /// Observations used.
    pub effective: usize,
    /// True when `effective < requested`.
    pub clamped: bool,
}

impl LookbackWindow {
    /// Fits `requested` observations into `available`.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when `requested` is zero.
    pub fn resolve(requested: usize, available: usize, what: &str) -> AnalyticsResult<Self> {
        if requested == 0 {
            return Err(AnalyticsError::invalid_configuration(format!(
                "{what}: lookback period must be at least 1"
            )));
        }
        if requested > available {
            log::warn!(
                "{what}: dataset too small, period {requested} taken as {available}"
            );
            return Ok(Self {
                requested,
                effective: available,
                clamped: true,
            });
        }
        Ok(Self {
            requested,
            effective: requested,
            clamped: false,
        })
    }
}

/// Largest peak-to-trough fall of the portfolio value within a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaximumDrawdown {
    /// `trough - peak`, in currency units (≤ 0).
    #[serde(with = "keel_core::float_serde")]
    pub value: f64,
    /// `(trough - peak) / peak` (≤ 0).
    #[serde(with = "keel_core::float_serde")]
    pub percentage: f64,
    /// Highest value in the window.
    #[serde(with = "keel_core::float_serde")]
    pub peak: f64,
    /// Lowest value from the peak to the window end.
    #[serde(with = "keel_core::float_serde")]
    pub trough: f64,
    /// Date of the peak.
    pub peak_date: Date,
    /// Date of the trough.
    pub trough_date: Date,
    /// Window used.
    pub window: LookbackWindow,
}

/// Percentage fall of a 1000-unit wealth index from its running peak.
///
/// Indexed by the return dates; every value is ≤ 0 and exactly 0 at a new peak.
pub fn drawdowns(ctx: &PortfolioContext) -> AnalyticsResult<Series> {
    let mut wealth = WEALTH_BASE;
    let mut peak = f64::NEG_INFINITY;
    let values: Vec<f64> = ctx
        .returns()
        .values()
        .iter()
        .map(|r| {
            wealth *= 1.0 + r;
            peak = peak.max(wealth);
            (wealth - peak) / peak
        })
        .collect();
    Ok(Series::new("Drawdowns", ctx.returns().dates().to_vec(), values)?)
}

/// Position of the first maximum, NaN never wins.
fn first_argmax(xs: &[f64]) -> usize {
    let mut best = 0;
    for (i, x) in xs.iter().enumerate() {
        if *x > xs[best] || xs[best].is_nan() {
            best = i;
        }
    }
    best
}

fn first_argmin(xs: &[f64]) -> usize {
    let mut best = 0;
    for (i, x) in xs.iter().enumerate() {
        if *x < xs[best] || xs[best].is_nan() {
            best = i;
        }
    }
    best
}

/// Maximum drawdown over the trailing `period` portfolio values.
///
/// The peak is the window's highest value; the trough is the lowest value
/// at or after the peak, so the drawdown is 0 for a rising path.
pub fn maximum_drawdown(ctx: &PortfolioContext, period: usize) -> AnalyticsResult<MaximumDrawdown> {
    let values = ctx.whole_portfolio();
    let dates = ctx.state_dates();
    let window = LookbackWindow::resolve(period, values.len(), "maximum drawdown")?;

    let start = values.len() - window.effective;
    let slice = &values[start..];
    let peak_pos = first_argmax(slice);
    let trough_pos = peak_pos + first_argmin(&slice[peak_pos..]);

    let peak = slice[peak_pos];
    let trough = slice[trough_pos];
    Ok(MaximumDrawdown {
        value: trough - peak,
        percentage: (trough - peak) / peak,
        peak,
        trough,
        peak_date: dates[start + peak_pos],
        trough_date: dates[start + trough_pos],
        window,
    })
}

/// Calmar ratio, in percent: excess mean over the absolute maximum drawdown.
pub fn calmar(ctx: &PortfolioContext, period: usize, config: &MetricConfig) -> AnalyticsResult<f64> {
    let convention = config.mean_convention()?;
    let mdd = maximum_drawdown(ctx, period)?;
    let numerator = ctx.excess_mean(convention, config.annual_rfr)?;
    checked_div(100.0 * numerator, mdd.percentage.abs(), "calmar ratio")
}

/// Sterling ratio, in percent: excess mean over the average of the
/// `count` deepest drawdowns.
///
/// # Errors
///
/// `InvalidConfiguration` when `count` is zero, `DivisionByZero` when the
/// path never falls.
pub fn sterling(ctx: &PortfolioContext, count: usize, config: &MetricConfig) -> AnalyticsResult<f64> {
    let convention = config.mean_convention()?;
    let mut path = drawdowns(ctx)?.values().to_vec();
    let window = LookbackWindow::resolve(count, path.len(), "sterling drawdowns")?;

    path.sort_by(f64::total_cmp);
    let deepest = &path[..window.effective];
    let average = deepest.iter().sum::<f64>() / deepest.len() as f64;

    let numerator = ctx.excess_mean(convention, config.annual_rfr)?;
    checked_div(100.0 * numerator, average.abs(), "sterling ratio")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context_from_returns, context_from_values};
    use approx::assert_relative_eq;
    use keel_core::Frequency;

    #[test]
    fn test_drawdown_path() {
        let ctx = context_from_returns(&[0.10, -0.10, 0.05, 0.20]);
        let dd = drawdowns(&ctx).unwrap();
        let v = dd.values();
        assert_eq!(v[0], 0.0);
        assert_relative_eq!(v[1], -0.10, epsilon = 1e-12);
        assert_relative_eq!(v[2], 0.9 * 1.05 - 1.0, epsilon = 1e-12);
        assert_eq!(v[3], 0.0);
        assert!(v.iter().all(|x| *x <= 0.0));
    }

    #[test]
    fn test_maximum_drawdown() {
        let ctx = context_from_values(&[100.0, 120.0, 90.0, 110.0, 80.0, 95.0], Frequency::Daily);
        let mdd = maximum_drawdown(&ctx, 6).unwrap();
        assert_eq!(mdd.peak, 120.0 * 10.0);
        assert_eq!(mdd.trough, 800.0);
        assert_relative_eq!(mdd.percentage, -400.0 / 1200.0, epsilon = 1e-12);
        assert_eq!(mdd.peak_date, ctx.state_dates()[1]);
        assert_eq!(mdd.trough_date, ctx.state_dates()[4]);
        assert!(!mdd.window.clamped);
    }

    #[test]
    fn test_maximum_drawdown_trailing_window() {
        let ctx = context_from_values(&[100.0, 120.0, 90.0, 110.0, 80.0, 95.0], Frequency::Daily);
        // last three values: 110, 80, 95
        let mdd = maximum_drawdown(&ctx, 3).unwrap();
        assert_eq!(mdd.peak, 1100.0);
        assert_eq!(mdd.trough, 800.0);
        assert_eq!(mdd.window.effective, 3);
    }

    #[test]
    fn test_maximum_drawdown_rising_path() {
        let ctx = context_from_values(&[100.0, 101.0, 103.0, 104.0], Frequency::Daily);
        let mdd = maximum_drawdown(&ctx, 4).unwrap();
        assert_eq!(mdd.value, 0.0);
        assert_eq!(mdd.percentage, 0.0);
    }

    #[test]
    fn test_period_boundaries() {
        let ctx = context_from_values(&[100.0, 90.0, 95.0, 85.0], Frequency::Daily);

        let exact = maximum_drawdown(&ctx, 4).unwrap();
        assert_eq!(exact.window.effective, 4);
        assert!(!exact.window.clamped);

        let long = maximum_drawdown(&ctx, 10).unwrap();
        assert_eq!(long.window.requested, 10);
        assert_eq!(long.window.effective, 4);
        assert!(long.window.clamped);
        assert_eq!(long.value, exact.value);

        assert!(matches!(
            maximum_drawdown(&ctx, 0),
            Err(AnalyticsError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_calmar() {
        let ctx = context_from_values(&[100.0, 120.0, 90.0, 110.0, 80.0, 95.0], Frequency::Daily);
        let config = MetricConfig::new();
        let expected = 100.0 * (ctx.geometric_mean() - 0.02) / (400.0 / 1200.0);
        assert_relative_eq!(calmar(&ctx, 6, &config).unwrap(), expected, epsilon = 1e-9);

        let rising = context_from_values(&[100.0, 101.0, 103.0], Frequency::Daily);
        assert!(matches!(
            calmar(&rising, 3, &config),
            Err(AnalyticsError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_sterling_takes_deepest_drawdowns() {
        let ctx = context_from_returns(&[-0.10, 0.05, -0.20, 0.30, -0.05]);
        let config = MetricConfig::per_period().with_rfr(0.0);
        let mut path = drawdowns(&ctx).unwrap().values().to_vec();
        path.sort_by(f64::total_cmp);
        let average = (path[0] + path[1]) / 2.0;
        let expected = 100.0 * ctx.mean() / average.abs();
        assert_relative_eq!(sterling(&ctx, 2, &config).unwrap(), expected, epsilon = 1e-9);
        assert!(average < -0.1);
    }

    #[test]
    fn test_sterling_clamps_count() {
        let ctx = context_from_returns(&[-0.10, 0.05, -0.20]);
        let config = MetricConfig::new();
        let clamped = sterling(&ctx, 50, &config).unwrap();
        let all = sterling(&ctx, 3, &config).unwrap();
        assert_relative_eq!(clamped, all);
        assert!(sterling(&ctx, 0, &config).is_err());
    }
}
