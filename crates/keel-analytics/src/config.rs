//! Configuration for metric and computation conventions.

use serde::{Deserialize, Serialize};

use keel_core::rates::to_period_rate;

use crate::error::{AnalyticsError, AnalyticsResult};

/// How the return mean is expressed before a ratio is formed.
///
/// Resolved from the `(annual, compounding)` pair on [`MetricConfig`]:
///
/// | annual | compounding | convention |
/// |--------|-------------|------------|
/// | true   | true        | `Geometric` |
/// | true   | false       | `Arithmetic` |
/// | false  | false       | `PerPeriod` |
/// | false  | true        | rejected |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeanConvention {
    /// Annualised by compounding: `Π(1+r)^(f/n) - 1`.
    Geometric,
    /// Annualised by scaling: `mean × f`.
    Arithmetic,
    /// Raw per-period mean.
    PerPeriod,
}

impl MeanConvention {
    /// True for the two annualised conventions.
    #[must_use]
    pub fn is_annual(self) -> bool {
        !matches!(self, MeanConvention::PerPeriod)
    }

    /// Expresses an annual rate on the same basis as the mean.
    ///
    /// Annual conventions compare against the annual rate directly;
    /// the per-period convention converts it with `frequency`.
    pub fn rate(self, annual_rate: f64, frequency: f64) -> AnalyticsResult<f64> {
        if self.is_annual() {
            Ok(annual_rate)
        } else {
            Ok(to_period_rate(annual_rate, frequency)?)
        }
    }
}

/// How downside and upside deviations are annualised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeviationScaling {
    /// Multiply by the frequency.
    #[default]
    Frequency,
    /// Multiply by the square root of the frequency.
    SqrtFrequency,
}

impl DeviationScaling {
    /// The multiplier for `frequency` periods per year.
    #[must_use]
    pub fn factor(self, frequency: f64) -> f64 {
        match self {
            DeviationScaling::Frequency => frequency,
            DeviationScaling::SqrtFrequency => frequency.sqrt(),
        }
    }
}

/// Conventions shared by every metric.
///
/// Rates are quoted annually and converted to per-period with the
/// context's frequency where a metric needs them per period.
///
/// # Example
///
/// ```rust
/// use keel_analytics::config::{MeanConvention, MetricConfig};
///
/// let config = MetricConfig::default().with_compounding(false);
/// assert_eq!(config.mean_convention().unwrap(), MeanConvention::Arithmetic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    /// Annual minimum acceptable return.
    pub annual_mar: f64,
    /// Annual risk-free rate.
    pub annual_rfr: f64,
    /// Express results on an annual basis.
    pub annual: bool,
    /// Annualise the mean geometrically rather than arithmetically.
    pub compounding: bool,
    /// Annualisation of upside and downside deviation.
    pub deviation_scaling: DeviationScaling,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            annual_mar: 0.03,
            annual_rfr: 0.02,
            annual: true,
            compounding: true,
            deviation_scaling: DeviationScaling::Frequency,
        }
    }
}

impl MetricConfig {
    /// Creates a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A per-period config: no annualisation, no compounding.
    #[must_use]
    pub fn per_period() -> Self {
        Self {
            annual: false,
            compounding: false,
            ..Self::default()
        }
    }

    /// Sets the annual minimum acceptable return.
    #[must_use]
    pub fn with_mar(mut self, annual_mar: f64) -> Self {
        self.annual_mar = annual_mar;
        self
    }

    /// Sets the annual risk-free rate.
    #[must_use]
    pub fn with_rfr(mut self, annual_rfr: f64) -> Self {
        self.annual_rfr = annual_rfr;
        self
    }

    /// Sets whether results are annualised.
    #[must_use]
    pub fn with_annual(mut self, annual: bool) -> Self {
        self.annual = annual;
        self
    }

    /// Sets whether the mean is compounded.
    #[must_use]
    pub fn with_compounding(mut self, compounding: bool) -> Self {
        self.compounding = compounding;
        self
    }

    /// Sets the deviation scaling.
    #[must_use]
    pub fn with_deviation_scaling(mut self, scaling: DeviationScaling) -> Self {
        self.deviation_scaling = scaling;
        self
    }

    /// Resolves the mean convention.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when compounding is requested without annualisation.
    pub fn mean_convention(&self) -> AnalyticsResult<MeanConvention> {
        match (self.annual, self.compounding) {
            (true, true) => Ok(MeanConvention::Geometric),
            (true, false) => Ok(MeanConvention::Arithmetic),
            (false, false) => Ok(MeanConvention::PerPeriod),
            (false, true) => Err(AnalyticsError::invalid_configuration(
                "compounding requires annual = true",
            )),
        }
    }

    /// Minimum acceptable return per period.
    pub fn period_mar(&self, frequency: f64) -> AnalyticsResult<f64> {
        Ok(to_period_rate(self.annual_mar, frequency)?)
    }

    /// Risk-free rate per period.
    pub fn period_rfr(&self, frequency: f64) -> AnalyticsResult<f64> {
        Ok(to_period_rate(self.annual_rfr, frequency)?)
    }
}

/// Configuration for computation strategy.
///
/// Controls when data-parallel loops (rolling windows, parameter sweeps)
/// switch to `rayon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Enable parallel processing (requires 'parallel' feature).
    pub parallel: bool,

    /// Minimum item count to trigger parallel processing.
    /// Below this threshold, sequential is faster due to thread overhead.
    pub parallel_threshold: usize,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 100,
        }
    }
}

impl ComputeConfig {
    /// Creates a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config that always uses sequential processing.
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    /// Sets whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Sets the threshold for parallel processing.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Returns true if parallel processing should be used for the given count.
    #[must_use]
    pub fn should_parallelize(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && count >= self.parallel_threshold
    }
}
