//! Linear interpolation.

use crate::error::{MathError, MathResult};

/// Piecewise-linear interpolation between data points.
///
/// Used to fill interior gaps in price columns, with the row position as
/// the x coordinate.
///
/// # Example
///
/// ```rust
/// use keel_math::interpolation::LinearInterpolator;
///
/// let interp = LinearInterpolator::new(vec![0.0, 2.0, 3.0], vec![100.0, 104.0, 103.0]).unwrap();
/// assert!((interp.interpolate(1.0).unwrap() - 102.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    allow_extrapolation: bool,
}

impl LinearInterpolator {
    /// Creates a new linear interpolator.
    ///
    /// # Arguments
    ///
    /// * `xs` - X coordinates (must be strictly increasing)
    /// * `ys` - Y coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than 2 points or if lengths differ.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        if xs.len() < 2 {
            return Err(MathError::insufficient_data(2, xs.len()));
        }
        if xs.len() != ys.len() {
            return Err(MathError::LengthMismatch {
                left: xs.len(),
                right: ys.len(),
            });
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(MathError::invalid_input(
                "x values must be strictly increasing",
            ));
        }

        Ok(Self {
            xs,
            ys,
            allow_extrapolation: false,
        })
    }

    /// Enables extrapolation beyond the data range.
    #[must_use]
    pub fn with_extrapolation(mut self) -> Self {
        self.allow_extrapolation = true;
        self
    }

    /// Smallest x in the data.
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.xs[0]
    }

    /// Largest x in the data.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }

    // Index i such that xs[i] <= x < xs[i+1], clamped to the end segments.
    fn find_segment(&self, x: f64) -> usize {
        let i = self.xs.partition_point(|probe| *probe <= x);
        i.saturating_sub(1).min(self.xs.len() - 2)
    }

    /// Returns the interpolated value at `x`.
    pub fn interpolate(&self, x: f64) -> MathResult<f64> {
        if !self.allow_extrapolation && (x < self.min_x() || x > self.max_x()) {
            return Err(MathError::ExtrapolationNotAllowed {
                x,
                min: self.min_x(),
                max: self.max_x(),
            });
        }

        let i = self.find_segment(x);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let t = (x - x0) / (x1 - x0);
        Ok(y0 + t * (y1 - y0))
    }
}
