//! Price History Port - Historical Observation Interface
//!
//! Defines the trait for fetching the raw `(t, p)` batch that seeds a
//! chart series. Implementations return observations exactly as received;
//! validation and ordering belong to the domain normalizer.

use async_trait::async_trait;

use crate::domain::series::{Observation, TokenId};

/// Trait for historical price providers.
///
/// A single call returns one batch. There is no retry contract here:
/// a failed fetch surfaces to the caller, which decides what to do.
#[async_trait]
pub trait PriceHistory: Send + Sync + 'static {
  /// Fetch the observation batch for one outcome token.
  ///
  /// The batch may be empty, unordered, or contain malformed entries.
  async fn fetch_history(&self, token_id: &TokenId) -> anyhow::Result<Vec<Observation>>;
}
