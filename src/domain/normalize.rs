//! Historical batch normalization.
//!
//! Turns a raw `/prices-history` batch into a chart-ready `Series`:
//! non-finite entries are dropped, the rest are stably sorted by time and
//! their probabilities clamped into `[0, 1]`. The operation is total.

use std::cmp::Ordering;

use super::series::{Observation, Point, Series, unit_value};

/// Normalize a batch of observations into an ascending series.
///
/// Entries sharing a timestamp keep their input order. No deduplication
/// happens here; the live merger resolves repeated tail timestamps.
pub fn normalize<I>(observations: I) -> Series
where
    I: IntoIterator<Item = Observation>,
{
    let mut points: Vec<Point> = observations
        .into_iter()
        .filter(|o| o.t.is_finite())
        .filter_map(|o| unit_value(o.p).map(|value| Point::new(o.t, value)))
        .collect();

    // `sort_by` is stable; every time is finite so `partial_cmp` is total here.
    points.sort_by(|a, b| a.time.partial_cmp(&b.time).unwrap_or(Ordering::Equal));

    Series::from_points_unchecked(points)
}

/// Number of observations `normalize` would discard.
pub fn count_invalid(observations: &[Observation]) -> usize {
    observations.iter().filter(|o| !o.is_finite()).count()
}
