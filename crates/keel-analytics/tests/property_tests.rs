//! Property-based tests for analytics invariants.
//!
//! These tests verify properties that should hold for any price path:
//! - Returns have one row fewer than prices
//! - Drawdowns are never positive and vanish at running peaks
//! - Omega does not increase with the MAR
//! - Maximum drawdown lies within the drawdown path's range

use keel_analytics::prelude::*;
use proptest::prelude::*;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

fn dates(n: usize) -> Vec<Date> {
    let start = Date::from_ymd(2021, 3, 1).unwrap();
    (0..n as u64).map(|i| start.add_days(i).unwrap()).collect()
}

fn context(returns: &[f64]) -> PortfolioContext {
    let mut prices = vec![100.0];
    for r in returns {
        let last = prices[prices.len() - 1];
        prices.push(last * (1.0 + r));
    }
    let tickers = vec!["X".to_string()];
    let panel = PricePanel::new(dates(prices.len()), tickers.clone(), vec![prices]).unwrap();
    PortfolioContext::new(panel, WeightVector::equal(&tickers).unwrap(), 10_000.0, Frequency::Daily)
        .unwrap()
}

fn returns_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.08f64..0.08, 5..120)
}

/// Returns with at least one loss and one gain, so Omega is defined.
fn mixed_returns_strategy() -> impl Strategy<Value = Vec<f64>> {
    returns_strategy().prop_map(|mut r| {
        r.push(-0.2);
        r.push(0.2);
        r
    })
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn property_returns_length(returns in returns_strategy()) {
        let ctx = context(&returns);
        prop_assert_eq!(ctx.returns().len(), ctx.prices().rows() - 1);
        prop_assert_eq!(ctx.cumulative_returns().len(), ctx.returns().len());
    }

    #[test]
    fn property_first_state_is_initial_aum(returns in returns_strategy()) {
        let ctx = context(&returns);
        prop_assert!((ctx.whole_portfolio()[0] - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn property_drawdowns_non_positive(returns in returns_strategy()) {
        let ctx = context(&returns);
        let path = drawdowns(&ctx).unwrap();
        let cumulative = ctx.cumulative_returns().values();
        let mut peak = f64::NEG_INFINITY;
        for (dd, growth) in path.values().iter().zip(cumulative) {
            prop_assert!(*dd <= 0.0);
            if *growth > peak * (1.0 + 1e-9) {
                prop_assert!(dd.abs() < 1e-9);
            }
            peak = peak.max(*growth);
        }
    }

    #[test]
    fn property_omega_non_increasing(returns in mixed_returns_strategy()) {
        let ctx = context(&returns);
        let curve = omega_curve(&ctx, &MarSweep::default(), &ComputeConfig::default()).unwrap();
        for pair in curve.omegas().windows(2) {
            prop_assert!(pair[1] <= pair[0] + 1e-12);
        }
    }

    #[test]
    fn property_maximum_drawdown_bounds(returns in returns_strategy()) {
        let ctx = context(&returns);
        let mdd = maximum_drawdown(&ctx, 1000).unwrap();
        prop_assert!(mdd.value <= 0.0);
        prop_assert!(mdd.percentage > -1.0);
        prop_assert!(mdd.peak_date <= mdd.trough_date);
    }

    #[test]
    fn property_historical_var_is_fraction(returns in returns_strategy(), value in -0.1f64..0.1) {
        let ctx = context(&returns);
        let p = historical_var(&ctx, value);
        prop_assert!((0.0..=1.0).contains(&p));
    }
}
