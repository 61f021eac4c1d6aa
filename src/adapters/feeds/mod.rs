//! Market Data Feed Adapters - Real-time Tick Streaming
//!
//! Provides the WebSocket-based live tick feed:
//! - Polymarket: CLOB market channel `last_trade_price` events

pub mod polymarket_ws;

pub use polymarket_ws::PolymarketTickFeed;
