//! # Keel Core
//!
//! Core types for the Keel portfolio analytics library.
//!
//! This crate provides the foundational building blocks used throughout Keel:
//!
//! - **Types**: `Date`, `PricePanel`, `WeightVector`, `Series`, `Frequency`
//! - **Rate Conversion**: Annual to per-period rates and back
//! - **Float codec**: NaN-safe serde for float fields ([`float_serde`])
//!
//! ## Design Philosophy
//!
//! - **Validated at the boundary**: Panels and weights check their invariants on construction
//! - **Immutable data**: Nothing in this crate mutates after it is built
//! - **Explicit Over Implicit**: Conventions such as sampling frequency are always passed in
//!
//! ## Example
//!
//! ```rust
//! use keel_core::prelude::*;
//!
//! let dates = vec![
//!     Date::from_ymd(2024, 1, 2).unwrap(),
//!     Date::from_ymd(2024, 1, 3).unwrap(),
//! ];
//! let panel = PricePanel::new(dates, vec!["SPY".to_string()], vec![vec![470.0, 472.5]]).unwrap();
//! assert_eq!(panel.rows(), 2);
//!
//! let daily = to_period_rate(0.03, 252.0).unwrap();
//! assert!(daily > 0.0 && daily < 0.0002);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod float_serde;
pub mod rates;
pub mod types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{CoreError, CoreResult};
    pub use crate::rates::{rebase_rate, to_annual_rate, to_period_rate};
    pub use crate::types::{Date, Frequency, PricePanel, Series, WeightVector};
}

// Re-export commonly used types at crate root
pub use error::{CoreError, CoreResult};
pub use types::{Date, Frequency, PricePanel, Series, WeightVector};
