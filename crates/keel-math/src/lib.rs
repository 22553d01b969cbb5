//! # Keel Math
//!
//! Numerical kernels for the Keel portfolio analytics library.
//!
//! This crate provides:
//!
//! - **Statistics**: Moments, covariance, histograms on `f64` slices
//! - **Regression**: Single-regressor ordinary least squares
//! - **Distributions**: Normal and Student-t location-scale families, chi-squared tails
//! - **Normality Tests**: Jarque-Bera, D'Agostino-Pearson, Shapiro-Wilk,
//!   Kolmogorov-Smirnov, Lilliefors, Anderson-Darling
//! - **Matrices**: Covariance and correlation matrices
//! - **Interpolation**: Linear interpolation for gap filling
//!
//! ## Design Philosophy
//!
//! - **Slices in, values out**: Kernels know nothing about dates or tickers
//! - **No silent NaN**: Degenerate input is an error, missing input propagates
//! - **Library-backed**: Special functions come from `statrs`, matrices from `nalgebra`

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::float_cmp)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::uninlined_format_args)]

pub mod distributions;
pub mod error;
pub mod interpolation;
pub mod matrix;
pub mod normality;
pub mod regression;
pub mod statistics;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::distributions::{
        chi_squared_sf, std_normal_cdf, std_normal_pdf, std_normal_quantile, Family,
        LocationScale,
    };
    pub use crate::error::{MathError, MathResult};
    pub use crate::interpolation::LinearInterpolator;
    pub use crate::matrix::{correlation_matrix, covariance_matrix, round_matrix};
    pub use crate::normality::{CriticalValue, NormalityStatistic};
    pub use crate::regression::{ols, LinearFit};
}

pub use error::{MathError, MathResult};
