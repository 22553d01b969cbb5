//! # Keel Analytics
//!
//! Portfolio risk and performance analytics for the Keel library.
//!
//! A [`PortfolioContext`] turns a price panel and a weight vector into a
//! buy-and-hold value path and a return series. Metric functions take the
//! context by reference and return fresh values:
//!
//! - **Benchmark**: CAPM, downside CAPM, Sharpe, Treynor, Jensen's alpha, tracking error
//! - **Downside**: upside/downside deviation, partial moments, Sortino, Kappa, gain-loss
//! - **Omega**: Omega ratio and Omega curve over a MAR sweep
//! - **Drawdown**: drawdown path, maximum drawdown, Calmar, Sterling
//! - **Ulcer**: Ulcer Index, rolling Ulcer series, Martin ratio
//! - **VaR**: parametric (normal, Student-t) and historical Value-at-Risk
//! - **Dispersion**: annualised covariance and correlation matrices
//! - **Diagnostics**: normality tests on the return distribution
//! - **Exploratory**: AUM statistics, net return, excess returns
//!
//! ## Design Philosophy
//!
//! - **Immutable context**: everything derived from the inputs is computed once
//! - **Explicit conventions**: annualisation and compounding come from [`MetricConfig`]
//! - **Caller-owned results**: [`AnalyticsRegistry`] collects outputs, the context never caches
//! - **No silent NaN**: degenerate denominators are errors
//!
//! ## Quick Start
//!
//! ```rust
//! use keel_analytics::prelude::*;
//!
//! let dates: Vec<Date> = (1..=6).map(|d| Date::from_ymd(2024, 1, d).unwrap()).collect();
//! let tickers = vec!["A".to_string(), "B".to_string()];
//! let panel = PricePanel::new(dates, tickers.clone(), vec![
//!     vec![100.0, 102.0, 101.0, 104.0, 103.0, 106.0],
//!     vec![50.0, 49.0, 51.0, 50.5, 52.0, 51.0],
//! ]).unwrap();
//!
//! let ctx = PortfolioContext::builder()
//!     .prices(panel)
//!     .weights(WeightVector::from_parts(&tickers, &[0.6, 0.4]).unwrap())
//!     .initial_aum(10_000.0)
//!     .build()
//!     .unwrap();
//!
//! let mdd = maximum_drawdown(&ctx, 5).unwrap();
//! assert!(mdd.value <= 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::uninlined_format_args)]

pub mod benchmark;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod dispersion;
pub mod downside;
pub mod drawdown;
pub mod error;
pub mod exploratory;
pub mod omega;
pub mod parallel;
pub mod preprocess;
pub mod registry;
pub mod report;
pub mod ulcer;
pub mod var;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::benchmark::{
        capm, downside_capm, downside_volatility_ratio, jensen_alpha, omega_excess_return, sharpe,
        tracking_error, treynor, CapmResult,
    };
    pub use crate::config::{ComputeConfig, DeviationScaling, MeanConvention, MetricConfig};
    pub use crate::context::{
        AssetReturns, PortfolioContext, PortfolioContextBuilder, PortfolioState, WHOLE_PORTFOLIO,
    };
    pub use crate::diagnostics::{distribution_test, NormalityTest, TestOutcome};
    pub use crate::dispersion::{correlation_matrix, covariance_matrix, LabeledMatrix};
    pub use crate::downside::{
        downside_deviation, gain_loss_ratio, higher_partial_moment, kappa, lower_partial_moment,
        sortino, upside_deviation, upside_potential_ratio, volatility_skew,
    };
    pub use crate::drawdown::{
        calmar, drawdowns, maximum_drawdown, sterling, LookbackWindow, MaximumDrawdown,
    };
    pub use crate::error::{AnalyticsError, AnalyticsResult};
    pub use crate::exploratory::{
        excess_returns, final_aum, max_aum, mean_aum, min_aum, net_return,
    };
    pub use crate::omega::{omega_curve, omega_ratio, omega_ratio_at, MarSweep, OmegaCurve};
    pub use crate::preprocess::{concatenate_returns, fill_nan, FillMethod, ReturnTable};
    pub use crate::registry::{AnalyticsRegistry, MetricValue, SharedRegistry};
    pub use crate::report::{Report, ReportConfig, ReportIssue};
    pub use crate::ulcer::{martin, ulcer_index, ulcer_series, UlcerIndex};
    pub use crate::var::{
        analytical_var, analytical_var_curve, historical_var, historical_var_histogram,
        AnalyticalVar, Distribution, VarCurve, VarHistogram,
    };
    pub use keel_core::{Date, Frequency, PricePanel, Series, WeightVector};
}

pub use config::{ComputeConfig, MetricConfig};
pub use context::PortfolioContext;
pub use error::{AnalyticsError, AnalyticsResult};
pub use registry::{AnalyticsRegistry, MetricValue};

#[cfg(test)]
pub(crate) mod test_support {
    use keel_core::{Date, Frequency, PricePanel, WeightVector};

    use crate::context::PortfolioContext;

    pub(crate) fn dates(n: usize) -> Vec<Date> {
        let start = Date::from_ymd(2020, 1, 1).unwrap();
        (0..n as u64).map(|i| start.add_days(i).unwrap()).collect()
    }

    /// Single-asset portfolio whose prices are exactly `values`.
    pub(crate) fn context_from_values(values: &[f64], frequency: Frequency) -> PortfolioContext {
        let tickers = vec!["X".to_string()];
        let panel = PricePanel::new(dates(values.len()), tickers.clone(), vec![values.to_vec()]).unwrap();
        let weights = WeightVector::equal(&tickers).unwrap();
        PortfolioContext::new(panel, weights, 1000.0, frequency).unwrap()
    }

    /// Single-asset daily portfolio whose returns are `returns`.
    pub(crate) fn context_from_returns(returns: &[f64]) -> PortfolioContext {
        context_from_returns_with(returns, Frequency::Daily)
    }

    pub(crate) fn context_from_returns_with(returns: &[f64], frequency: Frequency) -> PortfolioContext {
        let mut prices = vec![100.0];
        for r in returns {
            let last = prices[prices.len() - 1];
            prices.push(last * (1.0 + r));
        }
        context_from_values(&prices, frequency)
    }
}
