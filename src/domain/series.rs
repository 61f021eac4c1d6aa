//! Core price-series domain types.
//!
//! Defines the raw historical `Observation`, the validated chart `Point`,
//! the live `Tick`, and the ordered `Series` that the pipeline threads
//! through every call.
//!
//! Timestamps are unix seconds held as `f64`: the history endpoint and the
//! live feed may both deliver fractional or malformed values, and `f64`
//! keeps ordering and equality exact for every integer second.
//! Chart values are `Decimal` so that `1 - (1 - v) == v` holds exactly.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Lightweight token identifier used at the ports boundary.
pub type TokenId = String;

/// Convert a raw probability into a chart value in `[0, 1]`.
///
/// Returns `None` for NaN and infinities. Finite values are saturated at
/// the nearest bound before conversion, so the result is always in range.
///
/// The conversion keeps about 16 significant digits: `0.30000000000000004`
/// becomes `0.3` and `0.9999999999999999` becomes `1`. Inputs that differ
/// only past that precision map to the same value.
pub fn unit_value(p: f64) -> Option<Decimal> {
    if !p.is_finite() {
        return None;
    }
    // In range, conversion only fails on values below Decimal's precision
    Some(Decimal::from_f64(p.clamp(0.0, 1.0)).unwrap_or(Decimal::ZERO))
}

/// Saturate a chart value into `[0, 1]`.
#[inline]
pub fn clamp_unit(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE)
}

// ────────────────────────────────────────────
// Binary outcome
// ────────────────────────────────────────────

/// Side of a binary market a series is charted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Yes,
    No,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "YES"),
            Self::No => write!(f, "NO"),
        }
    }
}

// ────────────────────────────────────────────
// Pipeline input
// ────────────────────────────────────────────

/// Raw historical `(t, p)` pair as returned by `/prices-history`.
///
/// Deserialization never fails on a single bad field: numeric strings are
/// parsed, and `null`, missing, or unparsable values become NaN so the
/// normalizer drops the entry instead of the whole batch failing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Unix timestamp in seconds.
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub t: f64,
    /// Outcome probability, nominally in `[0, 1]`.
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub p: f64,
}

impl Observation {
    pub const fn new(t: f64, p: f64) -> Self {
        Self { t, p }
    }

    /// Both fields are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.t.is_finite() && self.p.is_finite()
    }
}

/// A single live price update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Unix timestamp in seconds.
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub time: f64,
    /// Last traded price of the outcome token.
    #[serde(default = "nan", deserialize_with = "lenient_f64")]
    pub price: f64,
}

impl Tick {
    pub const fn new(time: f64, price: f64) -> Self {
        Self { time, price }
    }

    /// Build a tick from a millisecond feed timestamp.
    ///
    /// Floors to whole seconds so every update inside the same second lands
    /// in the same chart bucket.
    pub fn from_millis(timestamp_ms: u64, price: f64) -> Self {
        Self {
            time: (timestamp_ms / 1000) as f64,
            price,
        }
    }

    /// The same update seen from the opposite outcome (`1 - price`).
    ///
    /// Non-finite prices stay non-finite and are rejected downstream.
    pub fn complement(self) -> Self {
        Self {
            time: self.time,
            price: 1.0 - self.price,
        }
    }

    /// Both fields are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.time.is_finite() && self.price.is_finite()
    }
}

// ────────────────────────────────────────────
// Pipeline output
// ────────────────────────────────────────────

/// Validated chart point. `value` always lies in `[0, 1]`.
///
/// Serialized as `{ "time": number, "value": number }` for the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Unix timestamp in seconds.
    pub time: f64,
    /// Probability in `[0, 1]`.
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl Point {
    pub const fn new(time: f64, value: Decimal) -> Self {
        Self { time, value }
    }

    /// Chart value as a float for rendering.
    pub fn value_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or(0.0)
    }

    /// Wall-clock time of the point, if it fits in a `DateTime`.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let secs = self.time.floor();
        let nanos = ((self.time - secs) * 1e9) as u32;
        DateTime::from_timestamp(secs as i64, nanos)
    }
}

/// Violation found when building a `Series` from arbitrary points.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SeriesError {
    #[error("point {index} has a non-finite time {time}")]
    NonFinite { index: usize, time: f64 },

    #[error("point {index} value {value} is outside [0, 1]")]
    OutOfRange { index: usize, value: Decimal },

    #[error("point {index} time {time} precedes previous time {previous}")]
    Unordered {
        index: usize,
        time: f64,
        previous: f64,
    },
}

/// What `Series::apply_tick` did with a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// Tick was later than the tail (or the series was empty) and was appended.
    Appended,
    /// Tick shared the tail's timestamp and overwrote its value.
    Replaced,
    /// Tick was earlier than the tail and was dropped.
    Stale,
    /// Tick had a non-finite field and was dropped.
    Invalid,
}

impl TickOutcome {
    /// Whether the series changed.
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Appended | Self::Replaced)
    }

    /// Stable label for logs and metrics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Appended => "appended",
            Self::Replaced => "replaced",
            Self::Stale => "stale",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ascending-time sequence of chart points.
///
/// Every constructor upholds the invariants: all fields finite, every value
/// in `[0, 1]`, times non-decreasing. The pipeline functions return new
/// series; `apply_tick` is the in-place form for a single owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<Point>,
}

impl Series {
    /// An empty series.
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Wrap points already known to satisfy the invariants.
    pub(crate) const fn from_points_unchecked(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The tail point.
    pub fn last(&self) -> Option<&Point> {
        self.points.last()
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Fold one live tick into the series in place.
    ///
    /// - non-finite tick: [`TickOutcome::Invalid`], unchanged
    /// - empty series: candidate appended
    /// - earlier than the tail: [`TickOutcome::Stale`], unchanged
    /// - same time as the tail: tail value overwritten
    /// - later than the tail: candidate appended
    pub fn apply_tick(&mut self, tick: Tick) -> TickOutcome {
        if !tick.time.is_finite() {
            return TickOutcome::Invalid;
        }
        let Some(value) = unit_value(tick.price) else {
            return TickOutcome::Invalid;
        };

        let candidate = Point::new(tick.time, value);

        let Some(tail) = self.points.last_mut() else {
            self.points.push(candidate);
            return TickOutcome::Appended;
        };

        if candidate.time < tail.time {
            TickOutcome::Stale
        } else if candidate.time == tail.time {
            tail.value = candidate.value;
            TickOutcome::Replaced
        } else {
            self.points.push(candidate);
            TickOutcome::Appended
        }
    }
}

impl TryFrom<Vec<Point>> for Series {
    type Error = SeriesError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        let mut previous: Option<f64> = None;
        for (index, point) in points.iter().enumerate() {
            if !point.time.is_finite() {
                return Err(SeriesError::NonFinite {
                    index,
                    time: point.time,
                });
            }
            if clamp_unit(point.value) != point.value {
                return Err(SeriesError::OutOfRange {
                    index,
                    value: point.value,
                });
            }
            if let Some(prev) = previous
                && point.time < prev
            {
                return Err(SeriesError::Unordered {
                    index,
                    time: point.time,
                    previous: prev,
                });
            }
            previous = Some(point.time);
        }
        Ok(Self { points })
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let points = Vec::<Point>::deserialize(deserializer)?;
        Self::try_from(points).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

// ────────────────────────────────────────────
// Lenient numeric decoding
// ────────────────────────────────────────────

const fn nan() -> f64 {
    f64::NAN
}

/// Accept a JSON number, a numeric string, or anything else as NaN.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        Raw::Other(_) => f64::NAN,
    })
}
