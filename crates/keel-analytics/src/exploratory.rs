//! Descriptive statistics of the portfolio value path.

use keel_core::Series;
use keel_math::statistics;

use crate::config::MetricConfig;
use crate::context::PortfolioContext;
use crate::error::AnalyticsResult;

/// Portfolio returns less the per-period MAR.
pub fn excess_returns(ctx: &PortfolioContext, config: &MetricConfig) -> AnalyticsResult<Series> {
    let mar = config.period_mar(ctx.periods_per_year())?;
    Ok(ctx.returns().map(|r| r - mar).renamed("Excess returns"))
}

/// Portfolio value on the last date.
pub fn final_aum(ctx: &PortfolioContext) -> AnalyticsResult<f64> {
    let values = ctx.whole_portfolio();
    Ok(values[values.len() - 1])
}

/// Lowest portfolio value.
pub fn min_aum(ctx: &PortfolioContext) -> AnalyticsResult<f64> {
    Ok(statistics::min(ctx.whole_portfolio())?)
}

/// Highest portfolio value.
pub fn max_aum(ctx: &PortfolioContext) -> AnalyticsResult<f64> {
    Ok(statistics::max(ctx.whole_portfolio())?)
}

/// Average portfolio value.
pub fn mean_aum(ctx: &PortfolioContext) -> AnalyticsResult<f64> {
    Ok(statistics::mean(ctx.whole_portfolio())?)
}

/// Gain over the holding period: `final - initial`, or as a fraction of
/// the initial AUM when `percentage` is set.
pub fn net_return(ctx: &PortfolioContext, percentage: bool) -> AnalyticsResult<f64> {
    let gain = final_aum(ctx)? - ctx.initial_aum();
    if percentage {
        Ok(gain / ctx.initial_aum())
    } else {
        Ok(gain)
    }
}
