//! Benchmark-relative analytics.
//!
//! A benchmark is a second [`PortfolioContext`] built the same way as the
//! portfolio. The two return series are inner-joined on date before any
//! comparison, and both contexts must share an observation frequency.

use serde::{Deserialize, Serialize};

use keel_core::Series;
use keel_math::regression::ols;
use keel_math::statistics::std_dev;

use crate::config::MetricConfig;
use crate::context::PortfolioContext;
use crate::downside::downside_deviation;
use crate::error::{checked_div, AnalyticsError, AnalyticsResult};

/// Regression of portfolio excess returns on benchmark excess returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapmResult {
    /// Intercept.
    #[serde(with = "keel_core::float_serde")]
    pub alpha: f64,
    /// Slope.
    #[serde(with = "keel_core::float_serde")]
    pub beta: f64,
    /// Coefficient of determination.
    #[serde(with = "keel_core::float_serde")]
    pub r_squared: f64,
    /// Number of aligned observations used.
    pub observations: usize,
    /// Portfolio excess returns used as the response.
    pub portfolio_excess: Series,
    /// Benchmark excess returns used as the regressor.
    pub benchmark_excess: Series,
}

impl CapmResult {
    /// Fitted portfolio excess return for a benchmark excess return.
    #[must_use]
    pub fn predict(&self, benchmark_excess: f64) -> f64 {
        self.alpha + self.beta * benchmark_excess
    }
}

fn check_frequency(portfolio: &PortfolioContext, benchmark: &PortfolioContext) -> AnalyticsResult<()> {
    if portfolio.frequency().periods_per_year() != benchmark.frequency().periods_per_year() {
        return Err(AnalyticsError::invalid_configuration(format!(
            "portfolio frequency {} differs from benchmark frequency {}",
            portfolio.frequency(),
            benchmark.frequency()
        )));
    }
    Ok(())
}

fn regress(
    what: &str,
    dates: Vec<keel_core::Date>,
    portfolio_excess: Vec<f64>,
    benchmark_excess: Vec<f64>,
) -> AnalyticsResult<CapmResult> {
    if dates.len() < 2 {
        return Err(AnalyticsError::insufficient_data(what, 2, dates.len()));
    }
    let fit = ols(&benchmark_excess, &portfolio_excess)?;
    Ok(CapmResult {
        alpha: fit.alpha,
        beta: fit.beta,
        r_squared: fit.r_squared,
        observations: fit.observations,
        portfolio_excess: Series::new("Portfolio excess", dates.clone(), portfolio_excess)?,
        benchmark_excess: Series::new("Benchmark excess", dates, benchmark_excess)?,
    })
}

/// Capital asset pricing model fit against the per-period risk-free rate.
///
/// # Errors
///
/// `InsufficientData` with fewer than two common dates, `ZeroVariance`
/// when the benchmark excess return is constant.
pub fn capm(
    portfolio: &PortfolioContext,
    benchmark: &PortfolioContext,
    config: &MetricConfig,
) -> AnalyticsResult<CapmResult> {
    check_frequency(portfolio, benchmark)?;
    let rfr = config.period_rfr(portfolio.periods_per_year())?;
    let (dates, p, b) = portfolio.returns().align(benchmark.returns());
    let p = p.into_iter().map(|r| r - rfr).collect();
    let b = b.into_iter().map(|r| r - rfr).collect();
    regress("capm", dates, p, b)
}

/// CAPM restricted to dates where the benchmark fell short of the MAR.
///
/// Both sides are measured as excess over the per-period MAR.
pub fn downside_capm(
    portfolio: &PortfolioContext,
    benchmark: &PortfolioContext,
    config: &MetricConfig,
) -> AnalyticsResult<CapmResult> {
    check_frequency(portfolio, benchmark)?;
    let mar = config.period_mar(portfolio.periods_per_year())?;
    let (dates, p, b) = portfolio.returns().align(benchmark.returns());

    let mut kept_dates = Vec::new();
    let mut kept_p = Vec::new();
    let mut kept_b = Vec::new();
    for ((date, pr), br) in dates.into_iter().zip(p).zip(b) {
        if br - mar < 0.0 {
            kept_dates.push(date);
            kept_p.push(pr - mar);
            kept_b.push(br - mar);
        }
    }
    regress("downside capm", kept_dates, kept_p, kept_b)
}

/// Sharpe ratio, in percent.
///
/// Annual conventions divide by the annualised volatility, the per-period
/// convention by the per-period volatility.
pub fn sharpe(ctx: &PortfolioContext, config: &MetricConfig) -> AnalyticsResult<f64> {
    let convention = config.mean_convention()?;
    let numerator = ctx.excess_mean(convention, config.annual_rfr)?;
    checked_div(100.0 * numerator, ctx.volatility_for(convention), "sharpe ratio")
}

/// Sample standard deviation of the return difference on common dates.
pub fn tracking_error(portfolio: &PortfolioContext, benchmark: &PortfolioContext) -> AnalyticsResult<f64> {
    let (dates, p, b) = portfolio.returns().align(benchmark.returns());
    if dates.len() < 2 {
        return Err(AnalyticsError::insufficient_data("tracking error", 2, dates.len()));
    }
    let active: Vec<f64> = p.iter().zip(&b).map(|(x, y)| x - y).collect();
    Ok(std_dev(&active, 1)?)
}

/// Jensen's alpha: portfolio excess mean less beta times benchmark excess mean.
///
/// Means follow the config's convention; beta comes from [`capm`].
pub fn jensen_alpha(
    portfolio: &PortfolioContext,
    benchmark: &PortfolioContext,
    config: &MetricConfig,
) -> AnalyticsResult<f64> {
    let convention = config.mean_convention()?;
    let beta = capm(portfolio, benchmark, config)?.beta;
    let portfolio_excess = portfolio.excess_mean(convention, config.annual_rfr)?;
    let benchmark_excess = benchmark.excess_mean(convention, config.annual_rfr)?;
    Ok(portfolio_excess - beta * benchmark_excess)
}

/// Treynor ratio, in percent: excess mean per unit of beta.
pub fn treynor(
    portfolio: &PortfolioContext,
    benchmark: &PortfolioContext,
    config: &MetricConfig,
) -> AnalyticsResult<f64> {
    let convention = config.mean_convention()?;
    let beta = capm(portfolio, benchmark, config)?.beta;
    let numerator = portfolio.excess_mean(convention, config.annual_rfr)?;
    checked_div(100.0 * numerator, beta, "treynor ratio")
}

/// Portfolio downside deviation over benchmark downside deviation.
pub fn downside_volatility_ratio(
    portfolio: &PortfolioContext,
    benchmark: &PortfolioContext,
    config: &MetricConfig,
) -> AnalyticsResult<f64> {
    check_frequency(portfolio, benchmark)?;
    let p = downside_deviation(portfolio, config)?;
    let b = downside_deviation(benchmark, config)?;
    checked_div(p, b, "downside volatility ratio")
}

/// Portfolio returns less three times the product of the two downside deviations.
pub fn omega_excess_return(
    portfolio: &PortfolioContext,
    benchmark: &PortfolioContext,
    config: &MetricConfig,
) -> AnalyticsResult<Series> {
    check_frequency(portfolio, benchmark)?;
    let penalty = 3.0 * downside_deviation(portfolio, config)? * downside_deviation(benchmark, config)?;
    Ok(portfolio
        .returns()
        .map(|r| r - penalty)
        .renamed("Omega excess return"))
}
