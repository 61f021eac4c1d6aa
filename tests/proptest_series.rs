//! Property-based tests for the series pipeline.
//!
//! Uses proptest to verify the ordering, range and merge laws of
//! `normalize`, `derive_inverse` and `merge_tick` across random inputs.

use proptest::prelude::*;
use rust_decimal::Decimal;

use polymarket_price_series::domain::series::unit_value;
use polymarket_price_series::domain::{
    Observation, Point, Series, Tick, TickOutcome, derive_inverse, merge_tick,
    merge_tick_with_outcome, normalize,
};

// ---- Strategies ----

/// Any f64, with the non-finite values well represented.
fn any_coord() -> impl Strategy<Value = f64> {
    prop_oneof![
        6 => -1.0e9f64..1.0e9,
        3 => -2.0f64..3.0,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn observation() -> impl Strategy<Value = Observation> {
    (any_coord(), any_coord()).prop_map(|(t, p)| Observation::new(t, p))
}

/// Observations drawn from a handful of timestamps, so ties are common.
fn clustered_observation() -> impl Strategy<Value = Observation> {
    let time = prop_oneof![
        8 => (0u8..6).prop_map(f64::from),
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
    ];
    (time, any_coord()).prop_map(|(t, p)| Observation::new(t, p))
}

/// Filter, stable sort by time, then clamp each price.
fn reference_normalize(batch: &[Observation]) -> Vec<Point> {
    let mut valid: Vec<Observation> = batch.iter().copied().filter(Observation::is_finite).collect();
    valid.sort_by(|a, b| a.t.total_cmp(&b.t));
    valid
        .into_iter()
        .map(|o| Point::new(o.t, unit_value(o.p).unwrap()))
        .collect()
}

fn finite_observation() -> impl Strategy<Value = Observation> {
    (0.0f64..1.0e6, -0.5f64..1.5).prop_map(|(t, p)| Observation::new(t, p))
}

/// A normalized, non-empty series.
fn series() -> impl Strategy<Value = Series> {
    prop::collection::vec(finite_observation(), 1..64).prop_map(normalize)
}

fn is_ordered_unit(series: &Series) -> bool {
    series.points().windows(2).all(|w| w[0].time <= w[1].time)
        && series
            .iter()
            .all(|p| p.time.is_finite() && p.value >= Decimal::ZERO && p.value <= Decimal::ONE)
}

// ---- Normalizer ----

proptest! {
    #[test]
    fn prop_normalize_output_ordered_and_in_range(
        batch in prop::collection::vec(observation(), 0..128),
    ) {
        let series = normalize(batch);
        prop_assert!(is_ordered_unit(&series));
    }

    #[test]
    fn prop_normalize_keeps_exactly_finite_entries(
        batch in prop::collection::vec(observation(), 0..128),
    ) {
        let finite = batch.iter().filter(|o| o.is_finite()).count();
        prop_assert_eq!(normalize(batch).len(), finite);
    }

    #[test]
    fn prop_normalize_matches_stable_sort_of_valid_entries(
        batch in prop::collection::vec(clustered_observation(), 0..128),
    ) {
        let series = normalize(batch.clone());
        let expected = reference_normalize(&batch);
        prop_assert_eq!(series.len(), expected.len());
        for (got, want) in series.iter().zip(&expected) {
            prop_assert_eq!(got.time, want.time);
            prop_assert_eq!(got.value, want.value);
        }
    }

    #[test]
    fn prop_normalize_is_idempotent_on_its_output(
        batch in prop::collection::vec(finite_observation(), 0..64),
    ) {
        let once = normalize(batch);
        let again = normalize(
            once.iter().map(|p| Observation::new(p.time, p.value_f64())),
        );
        prop_assert_eq!(once.len(), again.len());
        prop_assert!(once.iter().zip(again.iter()).all(|(a, b)| a.time == b.time));
    }
}

// ---- Inverse Deriver ----

proptest! {
    #[test]
    fn prop_inverse_is_exact_involution(s in series()) {
        prop_assert_eq!(derive_inverse(&derive_inverse(&s)), s);
    }

    #[test]
    fn prop_inverse_preserves_times_and_sums_to_one(s in series()) {
        let inv = derive_inverse(&s);
        prop_assert_eq!(inv.len(), s.len());
        for (a, b) in s.iter().zip(inv.iter()) {
            prop_assert_eq!(a.time, b.time);
            prop_assert_eq!(a.value + b.value, Decimal::ONE);
        }
        prop_assert!(is_ordered_unit(&inv));
    }
}

// ---- Live Merger ----

proptest! {
    #[test]
    fn prop_stale_tick_is_noop(s in series(), back in 0.001f64..1.0e3, price in -1.0f64..2.0) {
        let last = s.last().unwrap().time;
        let time = last - back;
        prop_assume!(time < last);
        prop_assert_eq!(merge_tick(&s, Tick::new(time, price)), s);
    }

    #[test]
    fn prop_equal_time_tick_replaces_tail(s in series(), price in -1.0f64..2.0) {
        let tail = *s.last().unwrap();
        let (next, outcome) = merge_tick_with_outcome(&s, Tick::new(tail.time, price));

        prop_assert_eq!(outcome, TickOutcome::Replaced);
        prop_assert_eq!(next.len(), s.len());
        prop_assert_eq!(&next.points()[..s.len() - 1], &s.points()[..s.len() - 1]);
        prop_assert_eq!(next.last().unwrap().value, unit_value(price).unwrap());
    }

    #[test]
    fn prop_later_tick_appends(s in series(), ahead in 0.001f64..1.0e3, price in -1.0f64..2.0) {
        let tail = s.last().unwrap().time;
        let (next, outcome) = merge_tick_with_outcome(&s, Tick::new(tail + ahead, price));

        prop_assert_eq!(outcome, TickOutcome::Appended);
        prop_assert_eq!(next.len(), s.len() + 1);
        prop_assert_eq!(&next.points()[..s.len()], s.points());
        prop_assert!(is_ordered_unit(&next));
    }

    #[test]
    fn prop_empty_series_takes_any_finite_tick(time in -1.0e9f64..1.0e9, price in -5.0f64..5.0) {
        let next = merge_tick(&Series::new(), Tick::new(time, price));
        prop_assert_eq!(next.len(), 1);
        prop_assert_eq!(next.points()[0].time, time);
        prop_assert!(is_ordered_unit(&next));
    }

    #[test]
    fn prop_non_finite_tick_is_noop(
        s in series(),
        bad in prop_oneof![Just(f64::NAN), Just(f64::INFINITY), Just(f64::NEG_INFINITY)],
        good in 0.0f64..1.0,
        bad_time in any::<bool>(),
    ) {
        let tail = s.last().unwrap().time;
        let tick = if bad_time { Tick::new(bad, good) } else { Tick::new(tail + 1.0, bad) };
        let (next, outcome) = merge_tick_with_outcome(&s, tick);
        prop_assert_eq!(outcome, TickOutcome::Invalid);
        prop_assert_eq!(next, s);
    }

    #[test]
    fn prop_folding_ticks_keeps_invariants(
        s in series(),
        ticks in prop::collection::vec((any_coord(), any_coord()), 0..64),
    ) {
        let folded = ticks
            .into_iter()
            .fold(s, |acc, (t, p)| merge_tick(&acc, Tick::new(t, p)));
        prop_assert!(is_ordered_unit(&folded));
    }
}
