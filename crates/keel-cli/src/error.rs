//! CLI error types.

use keel_analytics::AnalyticsError;
use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid date format.
    #[error("Invalid date: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    /// Invalid price cell.
    #[error("Invalid price '{value}' for {ticker} on {date}")]
    InvalidPrice {
        /// Ticker column.
        ticker: String,
        /// Row date.
        date: String,
        /// Cell content.
        value: String,
    },

    /// Weight list could not be parsed.
    #[error("Invalid weights: {0}. Use TICKER=WEIGHT,TICKER=WEIGHT.")]
    InvalidWeights(String),

    /// Price file has no usable header.
    #[error("Price file {0} needs a 'Date,<ticker>,...' header")]
    MissingHeader(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analytics error.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<keel_core::CoreError> for CliError {
    fn from(err: keel_core::CoreError) -> Self {
        CliError::Analytics(err.into())
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;
