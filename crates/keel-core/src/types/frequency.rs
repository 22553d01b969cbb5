//! Sampling frequency of return observations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of return observations per year.
///
/// Drives every annualisation in the library: mean returns scale by the
/// frequency, volatilities by its square root, and annual rates are
/// converted to per-period rates with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Frequency {
    /// Trading days (252 per year)
    #[default]
    Daily,
    /// Weekly observations (52 per year)
    Weekly,
    /// Monthly observations (12 per year)
    Monthly,
    /// Quarterly observations (4 per year)
    Quarterly,
    /// Annual observations (1 per year)
    Annual,
    /// Any other number of periods per year
    Custom(u32),
}

impl Frequency {
    /// Returns the number of periods per year.
    #[must_use]
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Frequency::Daily => 252,
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Annual => 1,
            Frequency::Custom(n) => *n,
        }
    }

    /// Returns the periods per year as a float, ready for exponentiation.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        f64::from(self.periods_per_year())
    }

    /// Maps a periods-per-year count onto a named frequency where one exists.
    #[must_use]
    pub fn from_periods(periods: u32) -> Self {
        match periods {
            252 => Frequency::Daily,
            52 => Frequency::Weekly,
            12 => Frequency::Monthly,
            4 => Frequency::Quarterly,
            1 => Frequency::Annual,
            n => Frequency::Custom(n),
        }
    }

    /// Returns true if the frequency can be used for annualisation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.periods_per_year() > 0
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "Daily"),
            Frequency::Weekly => write!(f, "Weekly"),
            Frequency::Monthly => write!(f, "Monthly"),
            Frequency::Quarterly => write!(f, "Quarterly"),
            Frequency::Annual => write!(f, "Annual"),
            Frequency::Custom(n) => write!(f, "{n}/year"),
        }
    }
}
