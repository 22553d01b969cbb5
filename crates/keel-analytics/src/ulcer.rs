//! Ulcer Index and Martin ratio.
//!
//! The Ulcer Index is the root-mean-square percentage drawdown of the
//! portfolio value from the highest value in a lookback window of closes.

use serde::{Deserialize, Serialize};

use keel_core::Series;

use crate::config::{ComputeConfig, MetricConfig};
use crate::context::PortfolioContext;
use crate::drawdown::LookbackWindow;
use crate::error::{checked_div, AnalyticsError, AnalyticsResult};
use crate::parallel::maybe_parallel_map;

/// Default Ulcer lookback, in closes.
pub const DEFAULT_ULCER_PERIOD: usize = 14;

/// Ulcer Index for one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UlcerIndex {
    /// RMS of the percentage drawdowns (in percent).
    #[serde(with = "keel_core::float_serde")]
    pub value: f64,
    /// Window used.
    pub window: LookbackWindow,
}

fn ulcer_of(closes: &[f64]) -> f64 {
    let high = closes
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let mean_square = closes
        .iter()
        .map(|c| (100.0 * (c - high) / high).powi(2))
        .sum::<f64>()
        / closes.len() as f64;
    mean_square.sqrt()
}

/// Ulcer Index over `period` closes ending `start` closes back.
///
/// `start = 1` ends the window at the latest close, `start = 2` one close
/// earlier, and so on. A window reaching past the first close is shortened.
///
/// # Errors
///
/// `InvalidConfiguration` when `period` or `start` is zero, or when `start`
/// points before the first close.
pub fn ulcer_index(ctx: &PortfolioContext, period: usize, start: usize) -> AnalyticsResult<UlcerIndex> {
    let closes = ctx.whole_portfolio();
    if start == 0 {
        return Err(AnalyticsError::invalid_configuration(
            "ulcer index: start must be at least 1 (1 = latest close)",
        ));
    }
    let offset = start - 1;
    if offset >= closes.len() {
        return Err(AnalyticsError::invalid_configuration(format!(
            "ulcer index: start {start} is before the first of {} closes",
            closes.len()
        )));
    }
    let end = closes.len() - offset;
    let window = LookbackWindow::resolve(period, end, "ulcer index")?;
    Ok(UlcerIndex {
        value: ulcer_of(&closes[end - window.effective..end]),
        window,
    })
}

/// Rolling Ulcer Index over the full history.
///
/// One value for every close that has `period` closes up to and including
/// it; the first value is dated at close number `period`.
///
/// # Errors
///
/// `InvalidConfiguration` for a zero period, `InsufficientData` when the
/// history is shorter than one window.
pub fn ulcer_series(
    ctx: &PortfolioContext,
    period: usize,
    compute: &ComputeConfig,
) -> AnalyticsResult<Series> {
    let closes = ctx.whole_portfolio();
    if period == 0 {
        return Err(AnalyticsError::invalid_configuration(
            "ulcer series: period must be at least 1",
        ));
    }
    if period > closes.len() {
        return Err(AnalyticsError::insufficient_data(
            "ulcer series",
            period,
            closes.len(),
        ));
    }

    let ends: Vec<usize> = (period..=closes.len()).collect();
    let values = maybe_parallel_map(&ends, compute, |end| ulcer_of(&closes[end - period..*end]));
    let dates = ctx.state_dates()[period - 1..].to_vec();
    Ok(Series::new("Ulcer Index", dates, values)?)
}

/// Martin ratio, in percent: excess mean over the latest Ulcer Index.
pub fn martin(ctx: &PortfolioContext, period: usize, config: &MetricConfig) -> AnalyticsResult<f64> {
    let convention = config.mean_convention()?;
    let ulcer = ulcer_index(ctx, period, 1)?;
    let numerator = ctx.excess_mean(convention, config.annual_rfr)?;
    checked_div(100.0 * numerator, ulcer.value, "martin ratio")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context_from_values;
    use approx::assert_relative_eq;
    use keel_core::Frequency;

    fn path() -> PortfolioContext {
        context_from_values(&[100.0, 110.0, 99.0, 104.5, 88.0, 110.0], Frequency::Daily)
    }

    #[test]
    fn test_ulcer_latest_window() {
        let ctx = path();
        // closes 104.5, 88, 110 (x10): high 110, drawdowns -5%, -20%, 0%
        let ui = ulcer_index(&ctx, 3, 1).unwrap();
        let expected = ((25.0 + 400.0 + 0.0) / 3.0f64).sqrt();
        assert_relative_eq!(ui.value, expected, epsilon = 1e-9);
        assert!(!ui.window.clamped);
    }

    #[test]
    fn test_ulcer_earlier_window() {
        let ctx = path();
        // start 2 ends at 88: closes 99, 104.5, 88, high 104.5
        let ui = ulcer_index(&ctx, 3, 2).unwrap();
        let d = |c: f64| 100.0 * (c - 104.5) / 104.5;
        let expected = ((d(99.0).powi(2) + 0.0 + d(88.0).powi(2)) / 3.0).sqrt();
        assert_relative_eq!(ui.value, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_ulcer_bounds() {
        let ctx = path();
        assert!(ulcer_index(&ctx, 0, 1).is_err());
        assert!(ulcer_index(&ctx, 3, 0).is_err());
        assert!(ulcer_index(&ctx, 3, 7).is_err());

        let clamped = ulcer_index(&ctx, 14, 1).unwrap();
        assert_eq!(clamped.window.effective, 6);
        assert!(clamped.window.clamped);

        let exact = ulcer_index(&ctx, 6, 1).unwrap();
        assert!(!exact.window.clamped);
        assert_relative_eq!(exact.value, clamped.value);
    }

    #[test]
    fn test_ulcer_series_matches_point_values() {
        let ctx = path();
        let series = ulcer_series(&ctx, 3, &ComputeConfig::sequential()).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.dates()[0], ctx.state_dates()[2]);
        let last = series.values()[3];
        assert_relative_eq!(last, ulcer_index(&ctx, 3, 1).unwrap().value, epsilon = 1e-12);
        let previous = series.values()[2];
        assert_relative_eq!(previous, ulcer_index(&ctx, 3, 2).unwrap().value, epsilon = 1e-12);
    }

    #[test]
    fn test_ulcer_series_too_short() {
        let ctx = path();
        assert!(matches!(
            ulcer_series(&ctx, 7, &ComputeConfig::default()),
            Err(AnalyticsError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_martin() {
        let ctx = path();
        let config = MetricConfig::new();
        let ui = ulcer_index(&ctx, DEFAULT_ULCER_PERIOD, 1).unwrap().value;
        let expected = 100.0 * (ctx.geometric_mean() - 0.02) / ui;
        assert_relative_eq!(martin(&ctx, DEFAULT_ULCER_PERIOD, &config).unwrap(), expected, epsilon = 1e-9);

        let rising = context_from_values(&[100.0, 101.0, 102.0], Frequency::Daily);
        assert!(matches!(
            martin(&rising, 3, &config),
            Err(AnalyticsError::DivisionByZero { .. })
        ));
    }
}
