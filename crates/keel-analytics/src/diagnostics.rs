//! Normality diagnostics on the portfolio return distribution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use keel_math::normality::{self, CriticalValue, NormalityStatistic};

use crate::context::PortfolioContext;
use crate::error::{AnalyticsError, AnalyticsResult};

/// Available normality tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalityTest {
    /// D'Agostino and Pearson's omnibus K² test.
    DagostinoPearson,
    /// Shapiro-Wilk W test.
    ShapiroWilk,
    /// Jarque-Bera test.
    JarqueBera,
    /// One-sample Kolmogorov-Smirnov test against N(0, 1).
    KolmogorovSmirnov,
    /// Lilliefors test (KS with estimated mean and deviation).
    Lilliefors,
    /// Anderson-Darling test with tabulated critical values.
    AndersonDarling,
}

impl NormalityTest {
    /// All tests in a stable order.
    pub const ALL: [NormalityTest; 6] = [
        NormalityTest::DagostinoPearson,
        NormalityTest::ShapiroWilk,
        NormalityTest::JarqueBera,
        NormalityTest::KolmogorovSmirnov,
        NormalityTest::Lilliefors,
        NormalityTest::AndersonDarling,
    ];

    /// Smallest sample the test accepts.
    #[must_use]
    pub fn min_observations(self) -> usize {
        match self {
            NormalityTest::DagostinoPearson => 8,
            NormalityTest::ShapiroWilk | NormalityTest::Lilliefors | NormalityTest::AndersonDarling => 3,
            NormalityTest::JarqueBera | NormalityTest::KolmogorovSmirnov => 2,
        }
    }

    fn run(self, xs: &[f64]) -> AnalyticsResult<NormalityStatistic> {
        let stat = match self {
            NormalityTest::DagostinoPearson => normality::dagostino_pearson(xs),
            NormalityTest::ShapiroWilk => normality::shapiro_wilk(xs),
            NormalityTest::JarqueBera => normality::jarque_bera(xs),
            NormalityTest::KolmogorovSmirnov => normality::kolmogorov_smirnov(xs),
            NormalityTest::Lilliefors => normality::lilliefors(xs),
            NormalityTest::AndersonDarling => normality::anderson_darling(xs),
        }?;
        Ok(stat)
    }
}

impl FromStr for NormalityTest {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match key.as_str() {
            "dagostinopearson" | "dagostino" | "normaltest" => Ok(NormalityTest::DagostinoPearson),
            "shapirowilk" | "shapiro" => Ok(NormalityTest::ShapiroWilk),
            "jarquebera" | "jarquebarre" | "jb" => Ok(NormalityTest::JarqueBera),
            "kolmogorovsmirnov" | "kolomogorovsmirnov" | "ks" => Ok(NormalityTest::KolmogorovSmirnov),
            "lilliefors" => Ok(NormalityTest::Lilliefors),
            "andersondarling" | "anderson" | "ad" => Ok(NormalityTest::AndersonDarling),
            _ => Err(AnalyticsError::UnsupportedTest {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for NormalityTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NormalityTest::DagostinoPearson => "D'Agostino-Pearson",
            NormalityTest::ShapiroWilk => "Shapiro-Wilk",
            NormalityTest::JarqueBera => "Jarque-Bera",
            NormalityTest::KolmogorovSmirnov => "Kolmogorov-Smirnov",
            NormalityTest::Lilliefors => "Lilliefors",
            NormalityTest::AndersonDarling => "Anderson-Darling",
        };
        write!(f, "{name}")
    }
}

/// Result of a normality test on the portfolio returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// The test that was run.
    pub test: NormalityTest,
    /// Test statistic.
    #[serde(with = "keel_core::float_serde")]
    pub statistic: f64,
    /// p-value under the normal null.
    #[serde(with = "keel_core::float_serde")]
    pub p_value: f64,
    /// Tabulated critical values, if the test has them.
    pub critical_values: Vec<CriticalValue>,
}

impl TestOutcome {
    /// True when normality is rejected at `significance` (e.g. 0.05).
    #[must_use]
    pub fn rejects_at(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Runs `test` on the portfolio returns.
///
/// # Errors
///
/// `InsufficientData` when there are fewer returns than the test accepts.
pub fn distribution_test(ctx: &PortfolioContext, test: NormalityTest) -> AnalyticsResult<TestOutcome> {
    let returns = ctx.returns().values();
    if returns.len() < test.min_observations() {
        return Err(AnalyticsError::insufficient_data(
            test.to_string(),
            test.min_observations(),
            returns.len(),
        ));
    }
    let stat = test.run(returns)?;
    log::debug!("{test}: statistic {:.6}, p-value {:.6}", stat.statistic, stat.p_value);
    Ok(TestOutcome {
        test,
        statistic: stat.statistic,
        p_value: stat.p_value,
        critical_values: stat.critical_values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::context_from_returns;

    fn sample() -> PortfolioContext {
        context_from_returns(&[
            0.004, -0.012, 0.007, 0.001, -0.003, 0.009, -0.006, 0.002, 0.011, -0.008, 0.0, 0.005,
        ])
    }

    #[test]
    fn test_names() {
        assert_eq!("Shapiro-Wilk".parse::<NormalityTest>().unwrap(), NormalityTest::ShapiroWilk);
        assert_eq!("jarque-barre".parse::<NormalityTest>().unwrap(), NormalityTest::JarqueBera);
        assert_eq!(
            "kolomogorov-smirnov".parse::<NormalityTest>().unwrap(),
            NormalityTest::KolmogorovSmirnov
        );
        assert_eq!(
            "D'Agostino-Pearson".parse::<NormalityTest>().unwrap(),
            NormalityTest::DagostinoPearson
        );
        assert!(matches!(
            "cramer".parse::<NormalityTest>(),
            Err(AnalyticsError::UnsupportedTest { .. })
        ));
        for test in NormalityTest::ALL {
            assert_eq!(test.to_string().parse::<NormalityTest>().unwrap(), test);
        }
    }

    #[test]
    fn test_every_test_runs() {
        let ctx = sample();
        for test in NormalityTest::ALL {
            let outcome = distribution_test(&ctx, test).unwrap();
            assert_eq!(outcome.test, test);
            assert!((0.0..=1.0).contains(&outcome.p_value), "{test}");
        }
    }

    #[test]
    fn test_anderson_darling_critical_values() {
        let outcome = distribution_test(&sample(), NormalityTest::AndersonDarling).unwrap();
        let levels: Vec<f64> = outcome.critical_values.iter().map(|c| c.significance).collect();
        assert_eq!(levels, vec![15.0, 10.0, 5.0, 2.5, 1.0]);
    }

    #[test]
    fn test_small_samples() {
        let ctx = context_from_returns(&[0.01, -0.02, 0.005]);
        assert!(matches!(
            distribution_test(&ctx, NormalityTest::DagostinoPearson),
            Err(AnalyticsError::InsufficientData { required: 8, .. })
        ));
        assert!(distribution_test(&ctx, NormalityTest::ShapiroWilk).is_ok());

        let two = context_from_returns(&[0.01, -0.02]);
        assert!(distribution_test(&two, NormalityTest::ShapiroWilk).is_err());
        assert!(distribution_test(&two, NormalityTest::JarqueBera).is_ok());
    }
}
