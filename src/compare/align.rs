//! Alignment and normalization of two historical price series
//!
//! Two independently fetched daily series rarely cover identical trading
//! days. This module inner-joins them on date, sorts the result, and rebases
//! both sides to 100 at the earliest shared day so they chart on one axis
//! regardless of absolute price level.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::data::PricePoint;

/// Errors that can occur when aligning two series
#[derive(Debug, Error, PartialEq)]
pub enum AlignError {
    /// The two series share no trading days; retrying the same inputs cannot
    /// change this
    #[error("the two series share no trading days")]
    NoOverlap,

    /// The close at the earliest shared day cannot serve as a rebasing
    /// denominator
    #[error("cannot rebase comparison: first shared close is {0}")]
    BadBase(f64),
}

/// One chart-ready point: both series' values on a shared trading day,
/// rebased so the earliest point is 100 for each side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPoint {
    /// Shared trading day
    pub date: NaiveDate,
    /// First series' rebased value
    pub a: f64,
    /// Second series' rebased value
    pub b: f64,
}

/// Inner-joins two daily close series on date and rebases both to 100
///
/// Input order is not assumed; the output is strictly ascending by date.
/// Dates present in only one series are dropped — no forward-fill, no
/// interpolation. Duplicate dates within one input resolve last-write-wins.
///
/// # Returns
/// * `Ok(Vec<AlignedPoint>)` - At least one point; the first is (100, 100)
/// * `Err(AlignError)` - Empty join, or a zero/non-finite base value
pub fn align_series(
    series_a: &[PricePoint],
    series_b: &[PricePoint],
) -> Result<Vec<AlignedPoint>, AlignError> {
    let mut closes_a: HashMap<NaiveDate, f64> = HashMap::with_capacity(series_a.len());
    for point in series_a {
        closes_a.insert(point.date, point.close);
    }

    // BTreeMap keeps the join sorted and collapses duplicate dates in B.
    let mut joined: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for point in series_b {
        if let Some(&close_a) = closes_a.get(&point.date) {
            joined.insert(point.date, (close_a, point.close));
        }
    }

    let (_, &(base_a, base_b)) = joined.iter().next().ok_or(AlignError::NoOverlap)?;
    for base in [base_a, base_b] {
        if !base.is_finite() || base == 0.0 {
            return Err(AlignError::BadBase(base));
        }
    }

    Ok(joined
        .into_iter()
        .map(|(date, (a, b))| AlignedPoint {
            date,
            a: a / base_a * 100.0,
            b: b / base_b * 100.0,
        })
        .collect())
}
