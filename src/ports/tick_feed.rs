//! Tick Feed Port - Real-time Price Tick Interface
//!
//! Defines the trait for receiving live last-trade ticks from a
//! prediction market platform (e.g., the Polymarket market channel).
//! Transport, reconnection and backpressure belong to the implementor.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::series::{Tick, TokenId};

/// A tick tagged with the token it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct TickEvent {
  /// Outcome token the trade happened on.
  pub token_id: TokenId,
  /// Time (unix seconds) and price of the trade.
  pub tick: Tick,
}

/// Trait for live tick providers.
///
/// Implementors emit `TickEvent`s in arrival order through one broadcast
/// channel per token. Receivers may lag; they never block the feed.
#[async_trait]
pub trait TickFeed: Send + Sync + 'static {
  /// Subscribe to a specific token's ticks.
  async fn subscribe(&self, token_id: &TokenId) -> broadcast::Receiver<TickEvent>;

  /// Check if the feed connection is healthy.
  async fn is_healthy(&self) -> bool;
}
