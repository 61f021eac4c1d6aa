//! Live tick merging.
//!
//! Folds one streaming tick into a series without touching the caller's
//! copy. The policy lives in [`Series::apply_tick`]; this is the pure form
//! for callers that keep several versions of a series around.

use super::series::{Series, Tick, TickOutcome};

/// Return `series` with `tick` folded in.
///
/// Invalid and stale ticks return an equal series. A tick at the tail's
/// timestamp replaces the tail value; a later one is appended.
pub fn merge_tick(series: &Series, tick: Tick) -> Series {
    merge_tick_with_outcome(series, tick).0
}

/// Like [`merge_tick`], also reporting what happened to the tick.
pub fn merge_tick_with_outcome(series: &Series, tick: Tick) -> (Series, TickOutcome) {
    let mut next = series.clone();
    let outcome = next.apply_tick(tick);
    (next, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::domain::series::Point;

    fn values(s: &Series) -> Vec<(f64, f64)> {
        s.iter().map(|p| (p.time, p.value_f64())).collect()
    }

    #[test]
    fn test_replace_then_append() {
        let s = Series::try_from(vec![Point::new(10.0, dec!(0.6))]).unwrap();

        let s = merge_tick(&s, Tick::new(10.0, 0.7));
        assert_eq!(values(&s), vec![(10.0, 0.7)]);

        let s = merge_tick(&s, Tick::new(12.0, 0.8));
        assert_eq!(values(&s), vec![(10.0, 0.7), (12.0, 0.8)]);
    }

    #[test]
    fn test_input_series_untouched() {
        let original = Series::try_from(vec![Point::new(1.0, dec!(0.5))]).unwrap();
        let snapshot = original.clone();

        let (next, outcome) = merge_tick_with_outcome(&original, Tick::new(1.0, 0.9));
        assert_eq!(outcome, TickOutcome::Replaced);
        assert_eq!(original, snapshot);
        assert_ne!(next, original);
    }

    #[test]
    fn test_empty_series_takes_clamped_tick() {
        let s = merge_tick(&Series::new(), Tick::new(4.0, -0.5));
        assert_eq!(s.points(), &[Point::new(4.0, Decimal::ZERO)]);
    }

    #[test]
    fn test_stale_and_invalid_ticks_are_noops() {
        let s = Series::try_from(vec![
            Point::new(5.0, dec!(0.25)),
            Point::new(8.0, dec!(0.5)),
        ])
        .unwrap();

        assert_eq!(merge_tick(&s, Tick::new(7.0, 0.9)), s);
        assert_eq!(merge_tick(&s, Tick::new(f64::INFINITY, 0.9)), s);
        assert_eq!(merge_tick(&s, Tick::new(9.0, f64::NAN)), s);
    }

    #[test]
    fn test_invalid_tick_on_empty_series_stays_empty() {
        let (s, outcome) = merge_tick_with_outcome(&Series::new(), Tick::new(f64::NAN, 0.5));
        assert!(s.is_empty());
        assert_eq!(outcome, TickOutcome::Invalid);
    }

    #[test]
    fn test_replace_resolves_duplicate_tail_from_history() {
        // normalize keeps tied timestamps; a tick at that time only rewrites the last one
        let s = Series::try_from(vec![
            Point::new(2.0, Decimal::ONE),
            Point::new(2.0, Decimal::ZERO),
        ])
        .unwrap();
        let s = merge_tick(&s, Tick::new(2.0, 0.5));
        assert_eq!(values(&s), vec![(2.0, 1.0), (2.0, 0.5)]);
    }
}
