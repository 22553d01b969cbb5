//! Continuous distributions used by VaR and the normality tests.
//!
//! Thin wrappers over `statrs`: a standard-normal toolkit that cannot fail,
//! and [`LocationScale`] for a normal or Student-t family shifted to a mean
//! and scaled by a volatility.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, Continuous, ContinuousCDF, Normal, StudentsT};
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::{PI, SQRT_2};

use crate::error::{MathError, MathResult};

/// Standard normal density.
#[must_use]
pub fn std_normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * PI).sqrt()
}

/// Standard normal CDF, accurate deep into the lower tail.
#[must_use]
pub fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Standard normal survival function, `1 - Φ(z)`.
#[must_use]
pub fn std_normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// Inverse standard normal CDF. Returns ±∞ at the boundaries and NaN outside `[0, 1]`.
#[must_use]
pub fn std_normal_quantile(p: f64) -> f64 {
    if !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Upper tail probability of a chi-squared variable.
pub fn chi_squared_sf(x: f64, dof: f64) -> MathResult<f64> {
    let chi = ChiSquared::new(dof).map_err(|e| {
        MathError::invalid_distribution(format!("chi-squared with {dof} dof: {e}"))
    })?;
    Ok(chi.sf(x))
}

/// Shape of a location-scale family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Family {
    /// Gaussian.
    Normal,
    /// Student's t with `dof` degrees of freedom.
    StudentT {
        /// Degrees of freedom.
        dof: f64,
    },
}

#[derive(Debug, Clone, Copy)]
enum Kernel {
    Normal(Normal),
    StudentT(StudentsT),
}

/// A [`Family`] located at `location` and scaled by `scale`.
///
/// # Example
///
/// ```rust
/// use keel_math::distributions::{Family, LocationScale};
///
/// let d = LocationScale::new(Family::Normal, 0.0005, 0.01).unwrap();
/// assert!((d.cdf(0.0005) - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LocationScale {
    family: Family,
    location: f64,
    scale: f64,
    kernel: Kernel,
}

impl LocationScale {
    /// Builds the distribution.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDistribution` when `scale` is not positive and finite,
    /// `location` is not finite, or `dof` is not positive.
    pub fn new(family: Family, location: f64, scale: f64) -> MathResult<Self> {
        if !location.is_finite() {
            return Err(MathError::invalid_distribution(format!(
                "location must be finite, got {location}"
            )));
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(MathError::invalid_distribution(format!(
                "scale must be positive, got {scale}"
            )));
        }
        let kernel = match family {
            Family::Normal => Kernel::Normal(
                Normal::new(location, scale)
                    .map_err(|e| MathError::invalid_distribution(e.to_string()))?,
            ),
            Family::StudentT { dof } => Kernel::StudentT(
                StudentsT::new(location, scale, dof)
                    .map_err(|e| MathError::invalid_distribution(format!("student-t: {e}")))?,
            ),
        };
        Ok(Self {
            family,
            location,
            scale,
            kernel,
        })
    }

    /// The family.
    #[must_use]
    pub fn family(&self) -> Family {
        self.family
    }

    /// Location parameter.
    #[must_use]
    pub fn location(&self) -> f64 {
        self.location
    }

    /// Scale parameter.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Cumulative probability at `x`.
    #[must_use]
    pub fn cdf(&self, x: f64) -> f64 {
        match &self.kernel {
            Kernel::Normal(d) => d.cdf(x),
            Kernel::StudentT(d) => d.cdf(x),
        }
    }

    /// Density at `x`.
    #[must_use]
    pub fn pdf(&self, x: f64) -> f64 {
        match &self.kernel {
            Kernel::Normal(d) => d.pdf(x),
            Kernel::StudentT(d) => d.pdf(x),
        }
    }

    /// Value below which a fraction `p` of the mass lies.
    pub fn quantile(&self, p: f64) -> MathResult<f64> {
        if !(p > 0.0 && p < 1.0) {
            return Err(MathError::invalid_input(format!(
                "quantile probability must be in (0, 1), got {p}"
            )));
        }
        Ok(match &self.kernel {
            Kernel::Normal(d) => d.inverse_cdf(p),
            Kernel::StudentT(d) => d.inverse_cdf(p),
        })
    }

    /// Standardised form of `x`: `(x - location) / scale`.
    #[must_use]
    pub fn standardize(&self, x: f64) -> f64 {
        (x - self.location) / self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_std_normal() {
        assert_relative_eq!(std_normal_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_relative_eq!(std_normal_cdf(1.959_963_984_540_054), 0.975, epsilon = 1e-12);
        assert_relative_eq!(std_normal_sf(1.0) + std_normal_cdf(1.0), 1.0, epsilon = 1e-15);
        assert_relative_eq!(std_normal_pdf(0.0), 0.398_942_280_401_432_7, epsilon = 1e-15);
        assert_relative_eq!(std_normal_quantile(0.975), 1.959_963_984_540_054, epsilon = 1e-9);
        assert!(std_normal_quantile(1.5).is_nan());
    }

    #[test]
    fn test_chi_squared_two_dof() {
        // sf for 2 dof is exp(-x / 2)
        assert_relative_eq!(chi_squared_sf(3.0, 2.0).unwrap(), (-1.5f64).exp(), epsilon = 1e-12);
        assert!(chi_squared_sf(1.0, 0.0).is_err());
    }

    #[test]
    fn test_location_scale_normal() {
        let d = LocationScale::new(Family::Normal, 0.001, 0.02).unwrap();
        assert_relative_eq!(d.cdf(0.001 - 0.02), std_normal_cdf(-1.0), epsilon = 1e-12);
        assert_relative_eq!(d.pdf(0.001), std_normal_pdf(0.0) / 0.02, epsilon = 1e-9);
        assert_relative_eq!(d.quantile(0.5).unwrap(), 0.001, epsilon = 1e-12);
        assert_relative_eq!(d.standardize(0.021), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_location_scale_student_t() {
        let d = LocationScale::new(Family::StudentT { dof: 5.0 }, 0.0, 1.0).unwrap();
        assert_relative_eq!(d.cdf(0.0), 0.5, epsilon = 1e-12);
        // t(5) 97.5% quantile
        assert_relative_eq!(d.quantile(0.975).unwrap(), 2.570_581_835_636_314, epsilon = 1e-4);
        // heavier tails than the normal
        assert!(d.cdf(-3.0) > std_normal_cdf(-3.0));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(LocationScale::new(Family::Normal, 0.0, 0.0).is_err());
        assert!(LocationScale::new(Family::Normal, f64::NAN, 1.0).is_err());
        assert!(LocationScale::new(Family::StudentT { dof: 0.0 }, 0.0, 1.0).is_err());
        let d = LocationScale::new(Family::Normal, 0.0, 1.0).unwrap();
        assert!(d.quantile(0.0).is_err());
    }
}
