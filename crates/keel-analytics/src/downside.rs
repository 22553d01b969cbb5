//! Partial moments and downside-risk ratios.
//!
//! Every statistic here is taken on the excess of each portfolio return
//! over the per-period minimum acceptable return (MAR).
//!
//! | Function | Definition |
//! |----------|------------|
//! | [`upside_deviation`] | sample std of the positive excesses |
//! | [`downside_deviation`] | sample std of the negative excesses |
//! | [`higher_partial_moment`] | `(1/n) Σ max(r - MAR, 0)^m` |
//! | [`lower_partial_moment`] | `(1/n) Σ max(MAR - r, 0)^m` |
//! | [`sortino`] | `100 (mean - rfr) / downside deviation` |
//! | [`kappa`] | `100 (mean - MAR) / LPM(m)^(1/m)` |

use keel_math::statistics::std_dev;

use crate::config::MetricConfig;
use crate::context::PortfolioContext;
use crate::error::{checked_div, AnalyticsError, AnalyticsResult};

/// Portfolio returns less the per-period MAR.
pub(crate) fn excess_over_mar(ctx: &PortfolioContext, config: &MetricConfig) -> AnalyticsResult<Vec<f64>> {
    let mar = config.period_mar(ctx.periods_per_year())?;
    Ok(excess_over(ctx.returns().values(), mar))
}

pub(crate) fn excess_over(returns: &[f64], threshold: f64) -> Vec<f64> {
    returns.iter().map(|r| r - threshold).collect()
}

// max(x, 0) that keeps NaN
fn positive_part(x: f64) -> f64 {
    if x > 0.0 || x.is_nan() {
        x
    } else {
        0.0
    }
}

fn check_moment(moment: u32) -> AnalyticsResult<()> {
    if moment == 0 {
        return Err(AnalyticsError::invalid_configuration(
            "partial moment order must be at least 1",
        ));
    }
    Ok(())
}

fn one_sided_deviation(
    ctx: &PortfolioContext,
    config: &MetricConfig,
    what: &str,
    keep: impl Fn(f64) -> bool,
) -> AnalyticsResult<f64> {
    let subset: Vec<f64> = excess_over_mar(ctx, config)?
        .into_iter()
        .filter(|x| keep(*x))
        .collect();
    if subset.len() < 2 {
        return Err(AnalyticsError::insufficient_data(what, 2, subset.len()));
    }
    let deviation = std_dev(&subset, 1)?;
    if config.annual {
        Ok(deviation * config.deviation_scaling.factor(ctx.periods_per_year()))
    } else {
        Ok(deviation)
    }
}

/// Sample standard deviation of the returns above the MAR.
///
/// Annualised with `config.deviation_scaling` when `config.annual` is set.
///
/// # Errors
///
/// `InsufficientData` when fewer than two returns exceed the MAR.
pub fn upside_deviation(ctx: &PortfolioContext, config: &MetricConfig) -> AnalyticsResult<f64> {
    one_sided_deviation(ctx, config, "upside deviation", |x| x > 0.0)
}

/// Sample standard deviation of the returns below the MAR.
///
/// Annualised with `config.deviation_scaling` when `config.annual` is set.
///
/// # Errors
///
/// `InsufficientData` when fewer than two returns fall below the MAR.
pub fn downside_deviation(ctx: &PortfolioContext, config: &MetricConfig) -> AnalyticsResult<f64> {
    one_sided_deviation(ctx, config, "downside deviation", |x| x < 0.0)
}

/// Upside over downside deviation.
pub fn volatility_skew(ctx: &PortfolioContext, config: &MetricConfig) -> AnalyticsResult<f64> {
    let upside = upside_deviation(ctx, config)?;
    let downside = downside_deviation(ctx, config)?;
    checked_div(upside, downside, "volatility skew")
}

/// Higher partial moment of order `moment` over all observations.
pub fn higher_partial_moment(
    ctx: &PortfolioContext,
    moment: u32,
    config: &MetricConfig,
) -> AnalyticsResult<f64> {
    check_moment(moment)?;
    let excess = excess_over_mar(ctx, config)?;
    let n = excess.len() as f64;
    Ok(excess
        .iter()
        .map(|x| positive_part(*x).powi(moment as i32))
        .sum::<f64>()
        / n)
}

/// Lower partial moment of order `moment` over all observations.
pub fn lower_partial_moment(
    ctx: &PortfolioContext,
    moment: u32,
    config: &MetricConfig,
) -> AnalyticsResult<f64> {
    check_moment(moment)?;
    let excess = excess_over_mar(ctx, config)?;
    let n = excess.len() as f64;
    Ok(excess
        .iter()
        .map(|x| positive_part(-x).powi(moment as i32))
        .sum::<f64>()
        / n)
}

/// First higher partial moment over the first lower partial moment.
pub fn gain_loss_ratio(ctx: &PortfolioContext, config: &MetricConfig) -> AnalyticsResult<f64> {
    let gain = higher_partial_moment(ctx, 1, config)?;
    let loss = lower_partial_moment(ctx, 1, config)?;
    checked_div(gain, loss, "gain-loss ratio")
}

/// Sortino ratio, in percent.
///
/// The mean and the risk-free rate follow the config's mean convention;
/// the downside deviation is annualised when the convention is annual.
pub fn sortino(ctx: &PortfolioContext, config: &MetricConfig) -> AnalyticsResult<f64> {
    let convention = config.mean_convention()?;
    let numerator = ctx.excess_mean(convention, config.annual_rfr)?;
    let downside = downside_deviation(ctx, config)?;
    checked_div(100.0 * numerator, downside, "sortino ratio")
}

/// Kappa ratio of order `moment`, in percent.
///
/// Kappa 1 is the Omega-Sharpe ratio, Kappa 2 the Sortino ratio computed
/// with a full-sample lower partial moment.
pub fn kappa(ctx: &PortfolioContext, moment: u32, config: &MetricConfig) -> AnalyticsResult<f64> {
    let convention = config.mean_convention()?;
    let lpm = lower_partial_moment(ctx, moment, config)?;
    let numerator = ctx.excess_mean(convention, config.annual_mar)?;
    checked_div(
        100.0 * numerator,
        lpm.powf(1.0 / f64::from(moment)),
        "kappa ratio",
    )
}

/// Sum of the positive excesses over the downside deviation.
pub fn upside_potential_ratio(ctx: &PortfolioContext, config: &MetricConfig) -> AnalyticsResult<f64> {
    let downside = downside_deviation(ctx, config)?;
    let upside: f64 = excess_over_mar(ctx, config)?
        .into_iter()
        .filter(|x| *x > 0.0)
        .sum();
    checked_div(upside, downside, "upside potential ratio")
}
