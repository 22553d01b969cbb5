//! One-call evaluation of the standard metric catalogue.
//!
//! Every metric runs as an independent job. Successes are recorded in an
//! [`AnalyticsRegistry`]; failures become [`ReportIssue`]s and never stop
//! the remaining jobs.

use serde::{Deserialize, Serialize};

use crate::benchmark;
use crate::config::{ComputeConfig, MetricConfig};
use crate::context::PortfolioContext;
use crate::diagnostics::{self, NormalityTest};
use crate::dispersion::{self, DEFAULT_DECIMALS};
use crate::downside;
use crate::drawdown::{self, DEFAULT_DRAWDOWN_PERIOD, DEFAULT_STERLING_DRAWDOWNS};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::exploratory;
use crate::omega::{self, MarSweep};
use crate::parallel::maybe_parallel_map;
use crate::registry::{AnalyticsRegistry, MetricValue, SharedRegistry};
use crate::ulcer::{self, DEFAULT_ULCER_PERIOD};
use crate::var::{self, Distribution};

/// Default Kappa order.
pub const DEFAULT_KAPPA_MOMENT: u32 = 3;

/// Call-level parameters of the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Maximum drawdown and Calmar lookback.
    pub drawdown_period: usize,
    /// Ulcer Index and Martin lookback.
    pub ulcer_period: usize,
    /// Drawdowns averaged by Sterling.
    pub sterling_drawdowns: usize,
    /// Kappa order.
    pub kappa_moment: u32,
    /// Return threshold for both VaR estimates.
    pub var_value: f64,
    /// Distribution for analytical VaR.
    pub var_distribution: Distribution,
    /// Test run on the return distribution.
    pub normality_test: NormalityTest,
    /// Decimals kept in the matrices.
    pub decimals: u32,
    /// Omega curve sweep.
    pub mar_sweep: MarSweep,
    /// Parallelism of the jobs and of the rolling series.
    pub compute: ComputeConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            drawdown_period: DEFAULT_DRAWDOWN_PERIOD,
            ulcer_period: DEFAULT_ULCER_PERIOD,
            sterling_drawdowns: DEFAULT_STERLING_DRAWDOWNS,
            kappa_moment: DEFAULT_KAPPA_MOMENT,
            var_value: -0.05,
            var_distribution: Distribution::Normal,
            normality_test: NormalityTest::JarqueBera,
            decimals: DEFAULT_DECIMALS,
            mar_sweep: MarSweep::default(),
            compute: ComputeConfig::default(),
        }
    }
}

impl ReportConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the drawdown lookback.
    #[must_use]
    pub fn with_drawdown_period(mut self, period: usize) -> Self {
        self.drawdown_period = period;
        self
    }

    /// Sets the Ulcer lookback.
    #[must_use]
    pub fn with_ulcer_period(mut self, period: usize) -> Self {
        self.ulcer_period = period;
        self
    }

    /// Sets the VaR threshold and distribution.
    #[must_use]
    pub fn with_var(mut self, value: f64, distribution: Distribution) -> Self {
        self.var_value = value;
        self.var_distribution = distribution;
        self
    }

    /// Sets the normality test.
    #[must_use]
    pub fn with_normality_test(mut self, test: NormalityTest) -> Self {
        self.normality_test = test;
        self
    }

    /// Sets the compute configuration.
    #[must_use]
    pub fn with_compute(mut self, compute: ComputeConfig) -> Self {
        self.compute = compute;
        self
    }
}

/// A metric that could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportIssue {
    /// Registry name of the metric.
    pub metric: String,
    /// Error message.
    pub error: String,
    /// True when the failure came from a parameter rather than the data.
    pub configuration: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Metric {
    Returns,
    CumulativeReturns,
    FinalAum,
    NetReturn,
    Mean,
    Volatility,
    Sharpe,
    Sortino,
    UpsideDeviation,
    DownsideDeviation,
    VolatilitySkew,
    GainLoss,
    Kappa,
    UpsidePotential,
    Omega,
    OmegaCurve,
    Drawdowns,
    MaximumDrawdown,
    Calmar,
    Sterling,
    UlcerIndex,
    UlcerSeries,
    Martin,
    AnalyticalVar,
    HistoricalVar,
    Correlation,
    Covariance,
    Normality,
    Capm,
    DownsideCapm,
    TrackingError,
    JensenAlpha,
    Treynor,
    DownsideVolatilityRatio,
    OmegaExcessReturn,
}

const PORTFOLIO_METRICS: [Metric; 28] = [
    Metric::Returns,
    Metric::CumulativeReturns,
    Metric::FinalAum,
    Metric::NetReturn,
    Metric::Mean,
    Metric::Volatility,
    Metric::Sharpe,
    Metric::Sortino,
    Metric::UpsideDeviation,
    Metric::DownsideDeviation,
    Metric::VolatilitySkew,
    Metric::GainLoss,
    Metric::Kappa,
    Metric::UpsidePotential,
    Metric::Omega,
    Metric::OmegaCurve,
    Metric::Drawdowns,
    Metric::MaximumDrawdown,
    Metric::Calmar,
    Metric::Sterling,
    Metric::UlcerIndex,
    Metric::UlcerSeries,
    Metric::Martin,
    Metric::AnalyticalVar,
    Metric::HistoricalVar,
    Metric::Correlation,
    Metric::Covariance,
    Metric::Normality,
];

const BENCHMARK_METRICS: [Metric; 7] = [
    Metric::Capm,
    Metric::DownsideCapm,
    Metric::TrackingError,
    Metric::JensenAlpha,
    Metric::Treynor,
    Metric::DownsideVolatilityRatio,
    Metric::OmegaExcessReturn,
];

impl Metric {
    fn name(self) -> &'static str {
        match self {
            Metric::Returns => "returns",
            Metric::CumulativeReturns => "cumulative_returns",
            Metric::FinalAum => "final_aum",
            Metric::NetReturn => "net_return",
            Metric::Mean => "mean",
            Metric::Volatility => "volatility",
            Metric::Sharpe => "sharpe",
            Metric::Sortino => "sortino",
            Metric::UpsideDeviation => "upside_deviation",
            Metric::DownsideDeviation => "downside_deviation",
            Metric::VolatilitySkew => "volatility_skew",
            Metric::GainLoss => "gain_loss_ratio",
            Metric::Kappa => "kappa",
            Metric::UpsidePotential => "upside_potential_ratio",
            Metric::Omega => "omega_ratio",
            Metric::OmegaCurve => "omega_curve",
            Metric::Drawdowns => "drawdowns",
            Metric::MaximumDrawdown => "maximum_drawdown",
            Metric::Calmar => "calmar",
            Metric::Sterling => "sterling",
            Metric::UlcerIndex => "ulcer_index",
            Metric::UlcerSeries => "ulcer_series",
            Metric::Martin => "martin",
            Metric::AnalyticalVar => "analytical_var",
            Metric::HistoricalVar => "historical_var",
            Metric::Correlation => "correlation_matrix",
            Metric::Covariance => "covariance_matrix",
            Metric::Normality => "normality_test",
            Metric::Capm => "capm",
            Metric::DownsideCapm => "downside_capm",
            Metric::TrackingError => "tracking_error",
            Metric::JensenAlpha => "jensen_alpha",
            Metric::Treynor => "treynor",
            Metric::DownsideVolatilityRatio => "downside_volatility_ratio",
            Metric::OmegaExcessReturn => "omega_excess_return",
        }
    }
}

struct Inputs<'a> {
    ctx: &'a PortfolioContext,
    benchmark: Option<&'a PortfolioContext>,
    config: &'a MetricConfig,
    report: &'a ReportConfig,
}

impl Inputs<'_> {
    fn benchmark(&self) -> AnalyticsResult<&PortfolioContext> {
        self.benchmark
            .ok_or_else(|| AnalyticsError::missing_field("benchmark"))
    }

    fn evaluate(&self, metric: Metric) -> AnalyticsResult<MetricValue> {
        let (ctx, config, rc) = (self.ctx, self.config, self.report);
        let value = match metric {
            Metric::Returns => ctx.returns().clone().into(),
            Metric::CumulativeReturns => ctx.cumulative_returns().clone().into(),
            Metric::FinalAum => exploratory::final_aum(ctx)?.into(),
            Metric::NetReturn => exploratory::net_return(ctx, true)?.into(),
            Metric::Mean => ctx.mean_for(config.mean_convention()?).into(),
            Metric::Volatility => ctx.volatility_for(config.mean_convention()?).into(),
            Metric::Sharpe => benchmark::sharpe(ctx, config)?.into(),
            Metric::Sortino => downside::sortino(ctx, config)?.into(),
            Metric::UpsideDeviation => downside::upside_deviation(ctx, config)?.into(),
            Metric::DownsideDeviation => downside::downside_deviation(ctx, config)?.into(),
            Metric::VolatilitySkew => downside::volatility_skew(ctx, config)?.into(),
            Metric::GainLoss => downside::gain_loss_ratio(ctx, config)?.into(),
            Metric::Kappa => downside::kappa(ctx, rc.kappa_moment, config)?.into(),
            Metric::UpsidePotential => downside::upside_potential_ratio(ctx, config)?.into(),
            Metric::Omega => omega::omega_ratio(ctx, config)?.into(),
            Metric::OmegaCurve => omega::omega_curve(ctx, &rc.mar_sweep, &rc.compute)?.into(),
            Metric::Drawdowns => drawdown::drawdowns(ctx)?.into(),
            Metric::MaximumDrawdown => drawdown::maximum_drawdown(ctx, rc.drawdown_period)?.into(),
            Metric::Calmar => drawdown::calmar(ctx, rc.drawdown_period, config)?.into(),
            Metric::Sterling => drawdown::sterling(ctx, rc.sterling_drawdowns, config)?.into(),
            Metric::UlcerIndex => ulcer::ulcer_index(ctx, rc.ulcer_period, 1)?.into(),
            Metric::UlcerSeries => ulcer::ulcer_series(ctx, rc.ulcer_period, &rc.compute)?.into(),
            Metric::Martin => ulcer::martin(ctx, rc.ulcer_period, config)?.into(),
            Metric::AnalyticalVar => {
                var::analytical_var(ctx, rc.var_value, rc.var_distribution, config)?.into()
            }
            Metric::HistoricalVar => var::historical_var(ctx, rc.var_value).into(),
            Metric::Correlation => dispersion::correlation_matrix(ctx, rc.decimals)?.into(),
            Metric::Covariance => dispersion::covariance_matrix(ctx, config.annual, rc.decimals)?.into(),
            Metric::Normality => diagnostics::distribution_test(ctx, rc.normality_test)?.into(),
            Metric::Capm => benchmark::capm(ctx, self.benchmark()?, config)?.into(),
            Metric::DownsideCapm => benchmark::downside_capm(ctx, self.benchmark()?, config)?.into(),
            Metric::TrackingError => benchmark::tracking_error(ctx, self.benchmark()?)?.into(),
            Metric::JensenAlpha => benchmark::jensen_alpha(ctx, self.benchmark()?, config)?.into(),
            Metric::Treynor => benchmark::treynor(ctx, self.benchmark()?, config)?.into(),
            Metric::DownsideVolatilityRatio => {
                benchmark::downside_volatility_ratio(ctx, self.benchmark()?, config)?.into()
            }
            Metric::OmegaExcessReturn => {
                benchmark::omega_excess_return(ctx, self.benchmark()?, config)?.into()
            }
        };
        Ok(value)
    }
}

/// The standard catalogue evaluated for one portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Portfolio name.
    pub portfolio: String,
    /// Benchmark name, if one was given.
    pub benchmark: Option<String>,
    /// Conventions used.
    pub config: MetricConfig,
    /// Computed metrics.
    pub registry: AnalyticsRegistry,
}

impl Report {
    /// Evaluates every metric, adding the benchmark-relative ones when a
    /// benchmark is given.
    pub fn compute(
        ctx: &PortfolioContext,
        benchmark: Option<&PortfolioContext>,
        config: &MetricConfig,
        report_config: &ReportConfig,
    ) -> (Report, Vec<ReportIssue>) {
        let mut metrics = PORTFOLIO_METRICS.to_vec();
        if benchmark.is_some() {
            metrics.extend(BENCHMARK_METRICS);
        }
        let inputs = Inputs {
            ctx,
            benchmark,
            config,
            report: report_config,
        };

        let shared = SharedRegistry::new();
        let outcomes = maybe_parallel_map(&metrics, &report_config.compute, |metric| {
            match inputs.evaluate(*metric) {
                Ok(value) => {
                    shared.record(metric.name(), value);
                    None
                }
                Err(err) => {
                    log::warn!("{}: {} failed: {err}", ctx.name(), metric.name());
                    Some(ReportIssue {
                        metric: metric.name().to_string(),
                        error: err.to_string(),
                        configuration: err.is_configuration(),
                    })
                }
            }
        });
        let issues: Vec<ReportIssue> = outcomes.into_iter().flatten().collect();
        log::debug!(
            "{}: report computed {} metrics, {} issues",
            ctx.name(),
            shared.len(),
            issues.len()
        );

        let report = Report {
            portfolio: ctx.name().to_string(),
            benchmark: benchmark.map(|b| b.name().to_string()),
            config: *config,
            registry: shared.take(),
        };
        (report, issues)
    }

    /// Scalar metrics in name order.
    #[must_use]
    pub fn scalars(&self) -> Vec<(String, f64)> {
        self.registry
            .iter()
            .filter_map(|(name, value)| match value {
                MetricValue::Scalar(v) => Some((name.to_string(), *v)),
                _ => None,
            })
            .collect()
    }

    /// Pretty JSON export.
    pub fn to_json(&self) -> AnalyticsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context_from_returns;

    const RETURNS: [f64; 12] = [
        0.004, -0.012, 0.007, 0.001, -0.003, 0.009, -0.006, 0.002, 0.011, -0.008, 0.0, 0.005,
    ];

    #[test]
    fn test_report_without_benchmark() {
        let ctx = context_from_returns(&RETURNS);
        let (report, issues) = Report::compute(
            &ctx,
            None,
            &MetricConfig::new(),
            &ReportConfig::new().with_ulcer_period(5).with_compute(ComputeConfig::sequential()),
        );
        assert_eq!(report.registry.len() + issues.len(), PORTFOLIO_METRICS.len());
        assert!(report.registry.contains("sharpe"));
        assert!(report.registry.contains("ulcer_series"));
        assert!(!report.registry.contains("capm"));
        assert!(report.benchmark.is_none());
        assert!(report.scalars().iter().any(|(name, _)| name == "sortino"));
    }

    #[test]
    fn test_failures_are_isolated() {
        let ctx = context_from_returns(&[0.01, 0.02, 0.03]);
        let (report, issues) = Report::compute(
            &ctx,
            None,
            &MetricConfig::new(),
            &ReportConfig::new().with_compute(ComputeConfig::sequential()),
        );
        // no losses: omega, calmar and friends fail, simple metrics survive
        assert!(issues.iter().any(|i| i.metric == "omega_ratio"));
        assert!(issues.iter().all(|i| !i.error.is_empty()));
        assert!(report.registry.contains("final_aum"));
        assert!(report.registry.contains("maximum_drawdown"));
    }

    #[test]
    fn test_report_with_benchmark() {
        let ctx = context_from_returns(&RETURNS);
        let bench = context_from_returns(&[
            0.003, -0.01, 0.006, 0.002, -0.004, 0.008, -0.005, 0.001, 0.01, -0.007, 0.001, 0.004,
        ]);
        let (report, _) = Report::compute(&ctx, Some(&bench), &MetricConfig::new(), &ReportConfig::default());
        assert!(matches!(report.registry.get("capm"), Some(MetricValue::Regression(_))));
        assert!(report.registry.contains("tracking_error"));
        assert!(report.to_json().unwrap().contains("\"capm\""));
    }

    #[test]
    fn test_configuration_issue_flag() {
        let ctx = context_from_returns(&RETURNS);
        let config = MetricConfig::new().with_annual(false);
        let (_, issues) = Report::compute(&ctx, None, &config, &ReportConfig::default());
        // compounding without annualisation has no meaning
        assert!(issues.iter().any(|i| i.metric == "sharpe" && i.configuration));
    }
}
