//! Fluent construction of a [`PortfolioContext`].

use keel_core::{Frequency, PricePanel, WeightVector};

use super::{PortfolioContext, DEFAULT_PORTFOLIO_NAME};
use crate::error::{AnalyticsError, AnalyticsResult};

/// Builder for constructing a [`PortfolioContext`].
///
/// Prices and weights are required. The name defaults to
/// `"Investment Portfolio"`, the initial AUM to 10,000 and the frequency
/// to daily.
///
/// # Example
///
/// ```rust
/// use keel_analytics::prelude::*;
///
/// let dates: Vec<Date> = (1..=3).map(|d| Date::from_ymd(2024, 1, d).unwrap()).collect();
/// let tickers = vec!["SPY".to_string()];
/// let panel = PricePanel::new(dates, tickers.clone(), vec![vec![400.0, 404.0, 402.0]]).unwrap();
///
/// let ctx = PortfolioContext::builder()
///     .name("Index")
///     .prices(panel)
///     .weights(WeightVector::equal(&tickers).unwrap())
///     .initial_aum(1_000_000.0)
///     .frequency(Frequency::Daily)
///     .build()
///     .unwrap();
/// assert_eq!(ctx.name(), "Index");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PortfolioContextBuilder {
    name: Option<String>,
    prices: Option<PricePanel>,
    weights: Option<WeightVector>,
    initial_aum: Option<f64>,
    frequency: Option<Frequency>,
    equal_weights: bool,
}

impl PortfolioContextBuilder {
    /// Default starting portfolio value.
    pub const DEFAULT_INITIAL_AUM: f64 = 10_000.0;

    /// Creates a new builder with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the portfolio name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the price panel.
    #[must_use]
    pub fn prices(mut self, prices: PricePanel) -> Self {
        self.prices = Some(prices);
        self
    }

    /// Sets the weights.
    #[must_use]
    pub fn weights(mut self, weights: WeightVector) -> Self {
        self.weights = Some(weights);
        self.equal_weights = false;
        self
    }

    /// Sets equal weights over the panel's tickers, resolved at build time.
    #[must_use]
    pub fn equal_weights(mut self) -> Self {
        self.weights = None;
        self.equal_weights = true;
        self
    }

    /// Sets the starting portfolio value.
    #[must_use]
    pub fn initial_aum(mut self, aum: f64) -> Self {
        self.initial_aum = Some(aum);
        self
    }

    /// Sets the observation frequency.
    #[must_use]
    pub fn frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    /// Builds the context.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Prices or weights are missing
    /// - Any of the checks in [`PortfolioContext::new`] fails
    pub fn build(self) -> AnalyticsResult<PortfolioContext> {
        let prices = self
            .prices
            .ok_or_else(|| AnalyticsError::missing_field("prices"))?;
        let weights = match self.weights {
            Some(weights) => weights,
            None if self.equal_weights => WeightVector::equal(prices.tickers())?,
            None => return Err(AnalyticsError::missing_field("weights")),
        };

        PortfolioContext::with_name(
            self.name
                .unwrap_or_else(|| DEFAULT_PORTFOLIO_NAME.to_string()),
            prices,
            weights,
            self.initial_aum.unwrap_or(Self::DEFAULT_INITIAL_AUM),
            self.frequency.unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_core::Date;

    fn panel() -> PricePanel {
        let dates = (1..=4).map(|d| Date::from_ymd(2024, 5, d).unwrap()).collect();
        PricePanel::new(
            dates,
            vec!["X".to_string(), "Y".to_string()],
            vec![vec![10.0, 11.0, 12.0, 11.5], vec![20.0, 19.0, 21.0, 22.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let ctx = PortfolioContextBuilder::new()
            .prices(panel())
            .equal_weights()
            .build()
            .unwrap();
        assert_eq!(ctx.name(), DEFAULT_PORTFOLIO_NAME);
        assert_eq!(ctx.initial_aum(), 10_000.0);
        assert_eq!(ctx.frequency(), Frequency::Daily);
        assert_eq!(ctx.aligned_weights(), &[0.5, 0.5]);
    }

    #[test]
    fn test_missing_fields() {
        let err = PortfolioContextBuilder::new().build().unwrap_err();
        assert_eq!(err, AnalyticsError::missing_field("prices"));

        let err = PortfolioContextBuilder::new().prices(panel()).build().unwrap_err();
        assert_eq!(err, AnalyticsError::missing_field("weights"));
    }

    #[test]
    fn test_explicit_fields() {
        let tickers = vec!["X".to_string(), "Y".to_string()];
        let ctx = PortfolioContextBuilder::new()
            .name("Growth")
            .prices(panel())
            .weights(WeightVector::from_parts(&tickers, &[0.75, 0.25]).unwrap())
            .initial_aum(500.0)
            .frequency(Frequency::Weekly)
            .build()
            .unwrap();
        assert_eq!(ctx.name(), "Growth");
        assert_eq!(ctx.returns().name(), "Growth");
        assert_eq!(ctx.allocation_funds(), &[375.0, 125.0]);
        assert_eq!(ctx.periods_per_year(), 52.0);
    }
}
