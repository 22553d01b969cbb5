//! Named storage for computed analytics.
//!
//! The context never caches metric results. Callers that want to keep
//! them record them here under a name of their choosing; the registry
//! serializes to JSON for export. [`SharedRegistry`] lets parallel jobs
//! record into one registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use keel_core::Series;

use crate::benchmark::CapmResult;
use crate::diagnostics::TestOutcome;
use crate::dispersion::LabeledMatrix;
use crate::drawdown::MaximumDrawdown;
use crate::error::AnalyticsResult;
use crate::omega::OmegaCurve;
use crate::preprocess::ReturnTable;
use crate::ulcer::UlcerIndex;
use crate::var::{AnalyticalVar, VarCurve, VarHistogram};

// =============================================================================
// METRIC VALUE
// =============================================================================

/// Any value the analytics functions produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    /// A single number.
    Scalar(#[serde(with = "keel_core::float_serde")] f64),
    /// A date-indexed series.
    Series(Series),
    /// A labelled square matrix.
    Matrix(LabeledMatrix),
    /// A CAPM fit.
    Regression(CapmResult),
    /// A maximum drawdown with its window.
    Drawdown(MaximumDrawdown),
    /// An Ulcer Index with its window.
    Ulcer(UlcerIndex),
    /// Analytical VaR.
    Var(AnalyticalVar),
    /// Fitted VaR density.
    VarCurve(VarCurve),
    /// Return histogram with the VaR threshold.
    Histogram(VarHistogram),
    /// Omega against a MAR sweep.
    OmegaCurve(OmegaCurve),
    /// A normality test outcome.
    Test(TestOutcome),
    /// Outer-joined return series.
    Table(ReturnTable),
}

impl MetricValue {
    /// Short name of the variant.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            MetricValue::Scalar(_) => "scalar",
            MetricValue::Series(_) => "series",
            MetricValue::Matrix(_) => "matrix",
            MetricValue::Regression(_) => "regression",
            MetricValue::Drawdown(_) => "drawdown",
            MetricValue::Ulcer(_) => "ulcer",
            MetricValue::Var(_) => "var",
            MetricValue::VarCurve(_) => "var_curve",
            MetricValue::Histogram(_) => "histogram",
            MetricValue::OmegaCurve(_) => "omega_curve",
            MetricValue::Test(_) => "test",
            MetricValue::Table(_) => "table",
        }
    }

    /// The headline number, for values that have one.
    ///
    /// Drawdowns report the percentage fall, VaR the probability, tests
    /// the p-value and regressions beta.
    #[must_use]
    pub fn headline(&self) -> Option<f64> {
        match self {
            MetricValue::Scalar(v) => Some(*v),
            MetricValue::Drawdown(d) => Some(d.percentage),
            MetricValue::Ulcer(u) => Some(u.value),
            MetricValue::Var(v) => Some(v.probability),
            MetricValue::Test(t) => Some(t.p_value),
            MetricValue::Regression(r) => Some(r.beta),
            MetricValue::Series(s) => s.last().map(|(_, v)| v),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for MetricValue {
                fn from(value: $ty) -> Self {
                    MetricValue::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    f64 => Scalar,
    Series => Series,
    LabeledMatrix => Matrix,
    CapmResult => Regression,
    MaximumDrawdown => Drawdown,
    UlcerIndex => Ulcer,
    AnalyticalVar => Var,
    VarCurve => VarCurve,
    VarHistogram => Histogram,
    OmegaCurve => OmegaCurve,
    TestOutcome => Test,
    ReturnTable => Table,
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Ordered map from metric name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalyticsRegistry {
    entries: BTreeMap<String, MetricValue>,
}

impl AnalyticsRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value, returning the one it replaces.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<MetricValue>) -> Option<MetricValue> {
        self.entries.insert(name.into(), value.into())
    }

    /// Value recorded under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.entries.get(name)
    }

    /// Scalar recorded under `name`.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<f64> {
        match self.entries.get(name) {
            Some(MetricValue::Scalar(v)) => Some(*v),
            _ => None,
        }
    }

    /// Removes and returns a value.
    pub fn remove(&mut self, name: &str) -> Option<MetricValue> {
        self.entries.remove(name)
    }

    /// True if a value is recorded under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Moves every entry of `other` into this registry.
    pub fn merge(&mut self, other: AnalyticsRegistry) {
        self.entries.extend(other.entries);
    }

    /// Pretty JSON export.
    pub fn to_json(&self) -> AnalyticsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a registry exported with [`AnalyticsRegistry::to_json`].
    pub fn from_json(json: &str) -> AnalyticsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// SHARED REGISTRY
// =============================================================================

/// A registry that many threads can record into.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<AnalyticsRegistry>>,
}

impl SharedRegistry {
    /// Creates an empty shared registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value.
    pub fn record(&self, name: impl Into<String>, value: impl Into<MetricValue>) {
        self.inner.write().insert(name, value);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// A copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> AnalyticsRegistry {
        self.inner.read().clone()
    }

    /// Takes the contents, leaving the shared registry empty.
    #[must_use]
    pub fn take(&self) -> AnalyticsRegistry {
        std::mem::take(&mut *self.inner.write())
    }
}

impl From<AnalyticsRegistry> for SharedRegistry {
    fn from(registry: AnalyticsRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::dates;

    #[test]
    fn test_insert_and_get() {
        let mut registry = AnalyticsRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.insert("sharpe", 1.25).is_none());
        assert_eq!(registry.scalar("sharpe"), Some(1.25));
        assert_eq!(registry.insert("sharpe", 1.5), Some(MetricValue::Scalar(1.25)));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("sharpe"));
        assert_eq!(registry.scalar("missing"), None);
    }

    #[test]
    fn test_ordering_and_kinds() {
        let mut registry = AnalyticsRegistry::new();
        let series = Series::new("Drawdowns", dates(2), vec![0.0, -0.1]).unwrap();
        registry.insert("zeta", 1.0);
        registry.insert("alpha", series);
        let names: Vec<&str> = registry.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(registry.get("alpha").unwrap().kind(), "series");
        assert_eq!(registry.get("alpha").unwrap().headline(), Some(-0.1));
        assert_eq!(registry.scalar("alpha"), None);
    }

    #[test]
    fn test_json_export() {
        let mut registry = AnalyticsRegistry::new();
        registry.insert("omega", 1.1);
        registry.insert("returns", Series::new("P", dates(2), vec![0.01, 0.02]).unwrap());

        let json = registry.to_json().unwrap();
        assert!(json.contains("\"kind\": \"scalar\""));
        let back = AnalyticsRegistry::from_json(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back.get("returns").unwrap().kind(), "series");
        assert!((back.scalar("omega").unwrap() - 1.1).abs() < 1e-12);
        assert!(AnalyticsRegistry::from_json("{").is_err());
    }

    #[test]
    fn test_shared_registry_across_threads() {
        let shared = SharedRegistry::new();
        std::thread::scope(|scope| {
            for i in 0..4 {
                let shared = shared.clone();
                scope.spawn(move || shared.record(format!("metric_{i}"), f64::from(i)));
            }
        });
        assert_eq!(shared.len(), 4);
        let registry = shared.take();
        assert_eq!(registry.scalar("metric_3"), Some(3.0));
        assert!(shared.is_empty());
    }

    #[test]
    fn test_merge() {
        let mut a = AnalyticsRegistry::new();
        a.insert("x", 1.0);
        let mut b = AnalyticsRegistry::new();
        b.insert("y", 2.0);
        a.merge(b);
        assert_eq!(a.len(), 2);
        let shared = SharedRegistry::from(a);
        assert_eq!(shared.snapshot().scalar("y"), Some(2.0));
    }

    #[test]
    fn test_json_keeps_non_finite_values() {
        let mut registry = AnalyticsRegistry::new();
        registry.insert("sharpe", f64::NAN);
        registry.insert("omega", f64::INFINITY);
        registry.insert("returns", Series::new("P", dates(2), vec![f64::NAN, 0.02]).unwrap());

        let json = registry.to_json().unwrap();
        let back = AnalyticsRegistry::from_json(&json).unwrap();
        assert!(back.scalar("sharpe").unwrap().is_nan());
        assert_eq!(back.scalar("omega"), Some(f64::INFINITY));
        match back.get("returns") {
            Some(MetricValue::Series(s)) => {
                assert!(s.values()[0].is_nan());
                assert_eq!(s.values()[1], 0.02);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
