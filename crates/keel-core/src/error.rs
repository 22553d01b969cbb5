//! Error types for the Keel core types.
//!
//! Every constructor in this crate validates its inputs and reports
//! violations through [`CoreError`].

use thiserror::Error;

/// A specialized Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// The main error type for core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Error in date parsing or an invalid calendar date.
    #[error("Invalid date: {message}")]
    InvalidDate {
        /// Description of the date error.
        message: String,
    },

    /// Sampling frequency must be strictly positive and finite.
    #[error("Invalid frequency: {value} (must be > 0)")]
    InvalidFrequency {
        /// The rejected frequency.
        value: f64,
    },

    /// Dates of a panel or series are not strictly increasing.
    #[error("Dates must be strictly increasing: {previous} is followed by {next}")]
    UnorderedDates {
        /// The earlier position's date.
        previous: String,
        /// The offending date.
        next: String,
    },

    /// A ticker appears more than once.
    #[error("Duplicate ticker: {ticker}")]
    DuplicateTicker {
        /// The repeated ticker.
        ticker: String,
    },

    /// A column has only missing values.
    #[error("Column '{ticker}' contains no prices")]
    EmptyColumn {
        /// The empty column's ticker.
        ticker: String,
    },

    /// Lengths that must agree do not.
    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        /// What was being compared.
        what: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Insufficient data points for the operation.
    #[error("Insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Minimum required points.
        required: usize,
        /// Actual number of points.
        actual: usize,
    },

    /// A ticker was looked up that does not exist.
    #[error("Unknown ticker: {ticker}")]
    UnknownTicker {
        /// The missing ticker.
        ticker: String,
    },

    /// Invalid input parameter.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Description of the invalid input.
        reason: String,
    },
}

impl CoreError {
    /// Creates an invalid date error.
    #[must_use]
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate {
            message: message.into(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(required: usize, actual: usize) -> Self {
        Self::InsufficientData { required, actual }
    }

    /// Creates a length mismatch error.
    #[must_use]
    pub fn length_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::LengthMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::insufficient_data(2, 1);
        assert!(err.to_string().contains("at least 2"));

        let err = CoreError::EmptyColumn {
            ticker: "AAPL".to_string(),
        };
        assert!(err.to_string().contains("AAPL"));
    }

    #[test]
    fn test_error_clone() {
        let err = CoreError::InvalidFrequency { value: 0.0 };
        assert_eq!(err.clone(), err);
    }
}
