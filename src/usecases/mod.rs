//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates the domain pipeline with port interfaces.
//!
//! Use cases:
//! - `SeriesTracker`: History load + live tick merging for one subject

pub mod series_tracker;

pub use series_tracker::SeriesTracker;
