//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use-case layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `PriceHistory`: Historical observation batches for one token
//! - `TickFeed`: Real-time last-trade ticks for subscribed tokens

pub mod price_history;
pub mod tick_feed;

pub use price_history::PriceHistory;
pub use tick_feed::{TickEvent, TickFeed};
