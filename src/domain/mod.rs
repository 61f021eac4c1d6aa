//! Domain layer - Price series pipeline.
//!
//! Pure, synchronous, total functions over chart series. No I/O and no
//! shared state (hexagonal architecture inner ring). Malformed or
//! out-of-order input is filtered, never reported as an error.
//!
//! Pipeline order:
//! 1. `normalize`: historical batch → ordered, clamped series
//! 2. `derive_inverse`: series for the opposite outcome
//! 3. `merge_tick`: fold live ticks into a series

pub mod inverse;
pub mod merge;
pub mod normalize;
pub mod series;

// Re-export core types for convenience
pub use inverse::derive_inverse;
pub use merge::{merge_tick, merge_tick_with_outcome};
pub use normalize::normalize;
pub use series::{
    Observation, Outcome, Point, Series, SeriesError, Tick, TickOutcome, TokenId,
};
