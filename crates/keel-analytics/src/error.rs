//! Error types for portfolio analytics.
//!
//! Three kinds of failure are distinguished: configuration errors
//! (a parameter combination that has no meaning), data insufficiency
//! (too few observations for the statistic) and degenerate input
//! (a zero denominator). Clamped lookback windows are not errors; they
//! are logged and reported on the result.

use keel_core::CoreError;
use keel_math::MathError;
use thiserror::Error;

/// Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Errors that can occur while building a portfolio or computing a metric.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Domain type validation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A numerical kernel failed.
    #[error(transparent)]
    Math(#[from] MathError),

    /// A parameter combination with no defined meaning.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Not enough observations for the requested statistic.
    #[error("Insufficient data for {what}: need {required}, got {actual}")]
    InsufficientData {
        /// The statistic or input being computed.
        what: String,
        /// Minimum number of observations.
        required: usize,
        /// Observations available.
        actual: usize,
    },

    /// An asset has a zero price on the first date, so no shares can be bought.
    #[error("Zero price for '{ticker}' on the first date")]
    ZeroPrice {
        /// The offending ticker.
        ticker: String,
    },

    /// Weight tickers do not match the price panel's tickers.
    #[error("Weights do not match prices: {reason}")]
    WeightMismatch {
        /// Which tickers disagree.
        reason: String,
    },

    /// Invalid scalar input.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// The reason the input is invalid.
        reason: String,
    },

    /// A statistic's denominator is zero.
    #[error("Division by zero in {operation}")]
    DivisionByZero {
        /// The operation that failed.
        operation: String,
    },

    /// Distribution name not recognised.
    #[error("Unsupported distribution: '{name}'")]
    UnsupportedDistribution {
        /// The name that was given.
        name: String,
    },

    /// Normality test name not recognised.
    #[error("Unsupported normality test: '{name}'")]
    UnsupportedTest {
        /// The name that was given.
        name: String,
    },

    /// Missing required field during construction.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: String,
    },

    /// Results could not be serialized.
    #[error("Serialization failed: {reason}")]
    Serialization {
        /// Serializer message.
        reason: String,
    },
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}

impl AnalyticsError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an insufficient data error.
    #[must_use]
    pub fn insufficient_data(what: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            what: what.into(),
            required,
            actual,
        }
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a division by zero error.
    #[must_use]
    pub fn division_by_zero(operation: impl Into<String>) -> Self {
        Self::DivisionByZero {
            operation: operation.into(),
        }
    }

    /// Create a missing field error.
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a weight mismatch error.
    #[must_use]
    pub fn weight_mismatch(reason: impl Into<String>) -> Self {
        Self::WeightMismatch {
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's parameters rather than the data.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. }
                | Self::UnsupportedDistribution { .. }
                | Self::UnsupportedTest { .. }
        )
    }
}

/// Divides, failing instead of returning an infinity or NaN.
pub(crate) fn checked_div(numerator: f64, denominator: f64, operation: &str) -> AnalyticsResult<f64> {
    if denominator == 0.0 {
        return Err(AnalyticsError::division_by_zero(operation));
    }
    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::invalid_configuration("compounding requires annual");
        assert!(err.to_string().contains("compounding requires annual"));

        let err = AnalyticsError::ZeroPrice {
            ticker: "AAPL".into(),
        };
        assert!(err.to_string().contains("AAPL"));

        let err = AnalyticsError::insufficient_data("returns", 2, 1);
        assert!(err.to_string().contains("need 2, got 1"));
    }

    #[test]
    fn test_from_lower_layers() {
        let err: AnalyticsError = MathError::zero_variance("benchmark").into();
        assert!(matches!(err, AnalyticsError::Math(MathError::ZeroVariance { .. })));

        let err: AnalyticsError = CoreError::invalid_input("bad").into();
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(AnalyticsError::invalid_configuration("x").is_configuration());
        assert!(AnalyticsError::UnsupportedTest { name: "foo".into() }.is_configuration());
        assert!(!AnalyticsError::division_by_zero("omega").is_configuration());
    }

    #[test]
    fn test_checked_div() {
        assert_eq!(checked_div(1.0, 4.0, "x").unwrap(), 0.25);
        assert!(matches!(
            checked_div(1.0, 0.0, "sortino"),
            Err(AnalyticsError::DivisionByZero { .. })
        ));
    }
}
