//! Complementary series for the opposite outcome of a binary market.

use rust_decimal::Decimal;

use super::series::{Point, Series, clamp_unit};

/// Map every point to `1 - value` at the same time.
///
/// Length and ordering are preserved. Applying it twice to an in-range
/// series gives back the original values.
pub fn derive_inverse(series: &Series) -> Series {
    let points = series
        .iter()
        .map(|p| Point::new(p.time, clamp_unit(Decimal::ONE - p.value)))
        .collect();
    Series::from_points_unchecked(points)
}
