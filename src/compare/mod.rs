//! Two-symbol performance comparison
//!
//! Turns a pair of historical close series into a single normalized series
//! suitable for charting side by side.

mod align;

pub use align::{align_series, AlignError, AlignedPoint};
