//! Returns and state engine.
//!
//! A [`PortfolioContext`] is built once from a price panel and a weight
//! vector. It buys `weight × initial_aum` of every asset on the first date,
//! holds the shares, and derives the value path, asset returns, portfolio
//! returns, cumulative returns and summary moments. Every metric module
//! reads from a shared `&PortfolioContext`; nothing on it changes after
//! construction.

mod builder;
mod state;

pub use builder::PortfolioContextBuilder;
pub use state::{AssetReturns, Moments, PortfolioState, WHOLE_PORTFOLIO};

use keel_core::{Date, Frequency, PricePanel, Series, WeightVector};

use crate::config::MeanConvention;
use crate::error::{AnalyticsError, AnalyticsResult};

/// Name given to a portfolio when none is supplied.
pub const DEFAULT_PORTFOLIO_NAME: &str = "Investment Portfolio";

/// Immutable portfolio value and return data.
///
/// # Example
///
/// ```rust
/// use keel_analytics::prelude::*;
///
/// let dates: Vec<Date> = (1..=3).map(|d| Date::from_ymd(2024, 1, d).unwrap()).collect();
/// let tickers = vec!["A".to_string(), "B".to_string()];
/// let panel = PricePanel::new(dates, tickers.clone(), vec![
///     vec![100.0, 110.0, 99.0],
///     vec![50.0, 55.0, 49.5],
/// ]).unwrap();
/// let weights = WeightVector::from_parts(&tickers, &[0.5, 0.5]).unwrap();
///
/// let ctx = PortfolioContext::new(panel, weights, 1000.0, Frequency::Daily).unwrap();
/// assert_eq!(ctx.state().whole_portfolio(), &[1000.0, 1100.0, 990.0]);
/// ```
#[derive(Debug, Clone)]
pub struct PortfolioContext {
    name: String,
    prices: PricePanel,
    weights: WeightVector,
    aligned_weights: Vec<f64>,
    initial_aum: f64,
    frequency: Frequency,
    allocation_funds: Vec<f64>,
    allocation_shares: Vec<f64>,
    state: PortfolioState,
    asset_returns: AssetReturns,
    returns: Series,
    cumulative_returns: Series,
    moments: Moments,
}

impl PortfolioContext {
    /// Builds a context with the default name.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a non-positive AUM or a zero frequency
    /// - `WeightMismatch` when weight tickers differ from the panel's
    /// - `ZeroPrice` when an asset's first price is zero
    /// - `InsufficientData` with fewer than two returns
    pub fn new(
        prices: PricePanel,
        weights: WeightVector,
        initial_aum: f64,
        frequency: Frequency,
    ) -> AnalyticsResult<Self> {
        Self::with_name(DEFAULT_PORTFOLIO_NAME, prices, weights, initial_aum, frequency)
    }

    /// Starts a fluent builder.
    #[must_use]
    pub fn builder() -> PortfolioContextBuilder {
        PortfolioContextBuilder::new()
    }

    /// Builds a named context. See [`PortfolioContext::new`] for errors.
    pub fn with_name(
        name: impl Into<String>,
        prices: PricePanel,
        weights: WeightVector,
        initial_aum: f64,
        frequency: Frequency,
    ) -> AnalyticsResult<Self> {
        let name = name.into();
        if !(initial_aum.is_finite() && initial_aum > 0.0) {
            return Err(AnalyticsError::invalid_input(format!(
                "initial AUM must be positive, got {initial_aum}"
            )));
        }
        if !frequency.is_valid() {
            return Err(AnalyticsError::invalid_input(format!(
                "frequency must be positive, got {frequency}"
            )));
        }

        let aligned_weights = weights
            .aligned_to(prices.tickers())
            .map_err(|e| AnalyticsError::weight_mismatch(e.to_string()))?;
        let weight_sum: f64 = aligned_weights.iter().sum();
        if (weight_sum - 1.0).abs() > 1e-6 {
            log::debug!("portfolio '{name}': weights sum to {weight_sum}, not 1");
        }

        let first = prices.first_row();
        if let Some(j) = first.iter().position(|p| *p == 0.0) {
            return Err(AnalyticsError::ZeroPrice {
                ticker: prices.tickers()[j].clone(),
            });
        }

        let allocation_funds: Vec<f64> = aligned_weights.iter().map(|w| w * initial_aum).collect();
        let allocation_shares: Vec<f64> = allocation_funds
            .iter()
            .zip(&first)
            .map(|(funds, price)| funds / price)
            .collect();

        let holdings: Vec<Vec<f64>> = prices
            .columns()
            .iter()
            .zip(&allocation_shares)
            .map(|(column, shares)| column.iter().map(|p| p * shares).collect())
            .collect();
        let state = PortfolioState::new(prices.dates().to_vec(), prices.tickers(), holdings);

        let asset_returns = AssetReturns::from_prices(prices.dates(), prices.tickers(), prices.columns());
        let portfolio_returns = asset_returns.weighted(&aligned_weights);
        let moments = Moments::compute(&portfolio_returns, frequency.as_f64())?;

        let cumulative: Vec<f64> = portfolio_returns
            .iter()
            .scan(1.0, |growth, r| {
                *growth *= 1.0 + r;
                Some(*growth)
            })
            .collect();

        let return_dates = asset_returns.dates().to_vec();
        let returns = Series::new(name.clone(), return_dates.clone(), portfolio_returns)?;
        let cumulative_returns = Series::new(format!("{name} (cumulative)"), return_dates, cumulative)?;

        log::debug!(
            "portfolio '{}': {} assets, {} returns, mean {:.6}, vol {:.6}",
            name,
            prices.cols(),
            moments.observations,
            moments.mean,
            moments.volatility
        );

        Ok(Self {
            name,
            prices,
            weights,
            aligned_weights,
            initial_aum,
            frequency,
            allocation_funds,
            allocation_shares,
            state,
            asset_returns,
            returns,
            cumulative_returns,
            moments,
        })
    }

    /// Portfolio name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Input prices.
    #[must_use]
    pub fn prices(&self) -> &PricePanel {
        &self.prices
    }

    /// Input weights.
    #[must_use]
    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Weights in the panel's ticker order.
    #[must_use]
    pub fn aligned_weights(&self) -> &[f64] {
        &self.aligned_weights
    }

    /// Tickers in column order.
    #[must_use]
    pub fn tickers(&self) -> &[String] {
        self.prices.tickers()
    }

    /// Starting portfolio value.
    #[must_use]
    pub fn initial_aum(&self) -> f64 {
        self.initial_aum
    }

    /// Observation frequency.
    #[must_use]
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Periods per year as a float.
    #[must_use]
    pub fn periods_per_year(&self) -> f64 {
        self.frequency.as_f64()
    }

    /// Funds allocated to each asset on the first date.
    #[must_use]
    pub fn allocation_funds(&self) -> &[f64] {
        &self.allocation_funds
    }

    /// Shares bought of each asset on the first date.
    #[must_use]
    pub fn allocation_shares(&self) -> &[f64] {
        &self.allocation_shares
    }

    /// Position and total values per date.
    #[must_use]
    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    /// Total portfolio value per date.
    #[must_use]
    pub fn whole_portfolio(&self) -> &[f64] {
        self.state.whole_portfolio()
    }

    /// Dates of the value path (every price date).
    #[must_use]
    pub fn state_dates(&self) -> &[Date] {
        self.state.dates()
    }

    /// Per-asset simple returns.
    #[must_use]
    pub fn asset_returns(&self) -> &AssetReturns {
        &self.asset_returns
    }

    /// Weighted portfolio returns.
    #[must_use]
    pub fn returns(&self) -> &Series {
        &self.returns
    }

    /// Growth of one unit, `Π(1 + r)`.
    #[must_use]
    pub fn cumulative_returns(&self) -> &Series {
        &self.cumulative_returns
    }

    /// All summary moments.
    #[must_use]
    pub fn moments(&self) -> &Moments {
        &self.moments
    }

    /// Per-period mean return.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.moments.mean
    }

    /// Arithmetically annualised mean.
    #[must_use]
    pub fn arithmetic_mean(&self) -> f64 {
        self.moments.arithmetic_mean
    }

    /// Geometrically annualised mean.
    #[must_use]
    pub fn geometric_mean(&self) -> f64 {
        self.moments.geometric_mean
    }

    /// Per-period volatility.
    #[must_use]
    pub fn volatility(&self) -> f64 {
        self.moments.volatility
    }

    /// Annualised volatility.
    #[must_use]
    pub fn annual_volatility(&self) -> f64 {
        self.moments.annual_volatility
    }

    /// The mean matching a convention.
    #[must_use]
    pub fn mean_for(&self, convention: MeanConvention) -> f64 {
        match convention {
            MeanConvention::Geometric => self.moments.geometric_mean,
            MeanConvention::Arithmetic => self.moments.arithmetic_mean,
            MeanConvention::PerPeriod => self.moments.mean,
        }
    }

    /// The volatility on the same basis as [`mean_for`](Self::mean_for).
    #[must_use]
    pub fn volatility_for(&self, convention: MeanConvention) -> f64 {
        if convention.is_annual() {
            self.moments.annual_volatility
        } else {
            self.moments.volatility
        }
    }

    /// Convention mean less an annual rate expressed on the same basis.
    ///
    /// The numerator of every Sharpe-style ratio.
    pub fn excess_mean(&self, convention: MeanConvention, annual_rate: f64) -> AnalyticsResult<f64> {
        let rate = convention.rate(annual_rate, self.periods_per_year())?;
        Ok(self.mean_for(convention) - rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dates(n: u32) -> Vec<Date> {
        (1..=n).map(|d| Date::from_ymd(2024, 1, d).unwrap()).collect()
    }

    fn two_asset() -> (PricePanel, WeightVector) {
        let tickers = vec!["A".to_string(), "B".to_string()];
        let panel = PricePanel::new(
            dates(3),
            tickers.clone(),
            vec![vec![100.0, 110.0, 99.0], vec![50.0, 55.0, 49.5]],
        )
        .unwrap();
        let weights = WeightVector::from_parts(&tickers, &[0.5, 0.5]).unwrap();
        (panel, weights)
    }

    #[test]
    fn test_two_asset_engine() {
        let (panel, weights) = two_asset();
        let ctx = PortfolioContext::new(panel, weights, 1000.0, Frequency::Daily).unwrap();

        assert_eq!(ctx.name(), DEFAULT_PORTFOLIO_NAME);
        assert_eq!(ctx.allocation_funds(), &[500.0, 500.0]);
        assert_eq!(ctx.allocation_shares(), &[5.0, 10.0]);
        assert_eq!(ctx.state().column("A").unwrap(), &[500.0, 550.0, 495.0]);
        assert_eq!(ctx.whole_portfolio(), &[1000.0, 1100.0, 990.0]);

        let r = ctx.returns().values();
        assert_eq!(r.len(), 2);
        assert_relative_eq!(r[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(r[1], -0.10, epsilon = 1e-12);
        assert_relative_eq!(ctx.cumulative_returns().values()[1], 0.99, epsilon = 1e-12);
        assert_relative_eq!(ctx.mean(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weights_reordered() {
        let (panel, _) = two_asset();
        let weights = WeightVector::new(vec![("B".into(), 0.25), ("A".into(), 0.75)]).unwrap();
        let ctx = PortfolioContext::new(panel, weights, 1000.0, Frequency::Daily).unwrap();
        assert_eq!(ctx.aligned_weights(), &[0.75, 0.25]);
    }

    #[test]
    fn test_weight_mismatch() {
        let (panel, _) = two_asset();
        let weights = WeightVector::new(vec![("A".into(), 0.5), ("C".into(), 0.5)]).unwrap();
        assert!(matches!(
            PortfolioContext::new(panel, weights, 1000.0, Frequency::Daily),
            Err(AnalyticsError::WeightMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_first_price() {
        let tickers = vec!["A".to_string()];
        let panel = PricePanel::new(dates(3), tickers.clone(), vec![vec![0.0, 1.0, 2.0]]).unwrap();
        let weights = WeightVector::equal(&tickers).unwrap();
        assert!(matches!(
            PortfolioContext::new(panel, weights, 1000.0, Frequency::Daily),
            Err(AnalyticsError::ZeroPrice { ticker }) if ticker == "A"
        ));
    }

    #[test]
    fn test_insufficient_returns() {
        let tickers = vec!["A".to_string()];
        let panel = PricePanel::new(dates(2), tickers.clone(), vec![vec![1.0, 2.0]]).unwrap();
        let weights = WeightVector::equal(&tickers).unwrap();
        assert!(matches!(
            PortfolioContext::new(panel, weights, 1000.0, Frequency::Daily),
            Err(AnalyticsError::InsufficientData { required: 2, actual: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_scalars() {
        let (panel, weights) = two_asset();
        assert!(matches!(
            PortfolioContext::new(panel.clone(), weights.clone(), 0.0, Frequency::Daily),
            Err(AnalyticsError::InvalidInput { .. })
        ));
        assert!(matches!(
            PortfolioContext::new(panel, weights, 1000.0, Frequency::Custom(0)),
            Err(AnalyticsError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_missing_prices_propagate() {
        let tickers = vec!["A".to_string()];
        let panel = PricePanel::new(dates(4), tickers.clone(), vec![vec![1.0, f64::NAN, 2.0, 2.2]]).unwrap();
        let weights = WeightVector::equal(&tickers).unwrap();
        let ctx = PortfolioContext::new(panel, weights, 1000.0, Frequency::Daily).unwrap();
        assert!(ctx.returns().values()[0].is_nan());
        assert!(ctx.mean().is_nan());
    }

    #[test]
    fn test_mean_for_convention() {
        let (panel, weights) = two_asset();
        let ctx = PortfolioContext::new(panel, weights, 1000.0, Frequency::Monthly).unwrap();
        assert_eq!(ctx.mean_for(MeanConvention::Geometric), ctx.geometric_mean());
        assert_eq!(ctx.mean_for(MeanConvention::Arithmetic), ctx.arithmetic_mean());
        assert_eq!(ctx.mean_for(MeanConvention::PerPeriod), ctx.mean());
        assert_eq!(ctx.volatility_for(MeanConvention::PerPeriod), ctx.volatility());
        assert_eq!(ctx.volatility_for(MeanConvention::Arithmetic), ctx.annual_volatility());

        let excess = ctx.excess_mean(MeanConvention::Arithmetic, 0.02).unwrap();
        assert_relative_eq!(excess, ctx.arithmetic_mean() - 0.02, epsilon = 1e-15);
        let excess = ctx.excess_mean(MeanConvention::PerPeriod, 0.12).unwrap();
        assert_relative_eq!(excess, ctx.mean() - (1.12f64.powf(1.0 / 12.0) - 1.0), epsilon = 1e-15);
    }
}
