//! Rate conversion between annual and per-period compounding.
//!
//! A minimum acceptable return or risk-free rate is quoted annually but
//! compared against per-period returns. With `f` observation periods per
//! year the equivalent per-period rate is `(1 + r)^(1/f) - 1`.

use crate::error::{CoreError, CoreResult};

fn check_frequency(frequency: f64) -> CoreResult<()> {
    if frequency.is_finite() && frequency > 0.0 {
        Ok(())
    } else {
        Err(CoreError::InvalidFrequency { value: frequency })
    }
}

/// Converts an annual rate to the per-period rate for `frequency` periods per year.
///
/// # Example
///
/// ```rust
/// use keel_core::rates::to_period_rate;
///
/// let monthly = to_period_rate(0.12, 12.0).unwrap();
/// assert!((monthly - 0.009_488_79).abs() < 1e-8);
/// ```
pub fn to_period_rate(annual_rate: f64, frequency: f64) -> CoreResult<f64> {
    check_frequency(frequency)?;
    Ok((1.0 + annual_rate).powf(1.0 / frequency) - 1.0)
}

/// Converts a per-period rate back to the annual rate.
pub fn to_annual_rate(period_rate: f64, frequency: f64) -> CoreResult<f64> {
    check_frequency(frequency)?;
    Ok((1.0 + period_rate).powf(frequency) - 1.0)
}

/// Re-expresses a rate in another periodicity.
///
/// `periods` is how many input periods make up one output period:
/// `1/252` turns an annual rate into a trading-day rate, `1/365` into a
/// calendar-day rate, `12` turns a monthly rate into an annual one.
pub fn rebase_rate(rate: f64, periods: f64) -> CoreResult<f64> {
    if !periods.is_finite() || periods <= 0.0 {
        return Err(CoreError::invalid_input(format!(
            "periods must be positive, got {periods}"
        )));
    }
    Ok((1.0 + rate).powf(periods) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_daily_rate() {
        let daily = to_period_rate(0.03, 252.0).unwrap();
        assert_relative_eq!((1.0 + daily).powi(252), 1.03, epsilon = 1e-12);
    }

    #[test]
    fn test_annual_frequency_is_identity() {
        assert_relative_eq!(to_period_rate(0.05, 1.0).unwrap(), 0.05, epsilon = 1e-15);
    }

    #[test]
    fn test_rejects_bad_frequency() {
        assert!(matches!(
            to_period_rate(0.03, 0.0),
            Err(CoreError::InvalidFrequency { .. })
        ));
        assert!(to_period_rate(0.03, -12.0).is_err());
        assert!(to_annual_rate(0.01, f64::NAN).is_err());
    }

    #[test]
    fn test_rebase_rate() {
        let daily = rebase_rate(0.10, 1.0 / 365.0).unwrap();
        assert_relative_eq!(rebase_rate(daily, 365.0).unwrap(), 0.10, epsilon = 1e-12);
        assert!(rebase_rate(0.10, 0.0).is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            rate in -0.99f64..10.0,
            frequency in prop::sample::select(vec![1.0, 12.0, 52.0, 252.0]),
        ) {
            let period = to_period_rate(rate, frequency).unwrap();
            let annual = to_annual_rate(period, frequency).unwrap();
            prop_assert!((annual - rate).abs() <= 1e-9 * (1.0 + rate.abs()));
        }
    }
}
