//! Domain types for portfolio analytics.
//!
//! This module provides type-safe representations of the inputs and
//! intermediate data used in return and risk calculations.

mod date;
mod frequency;
mod panel;
mod series;
mod weights;

pub use date::Date;
pub use frequency::Frequency;
pub use panel::PricePanel;
pub use series::Series;
pub use weights::WeightVector;
