//! Polymarket CLOB API Adapter
//!
//! Implements the HTTP side of the pipeline's inputs: the historical
//! price batch that seeds each chart series.
//!
//! Sub-modules:
//! - `client`: HTTP client with timeout and concurrency bound
//! - `history`: `PriceHistory` port implementation
//! - `types`: API response type definitions

pub mod client;
pub mod history;
pub mod types;

pub use client::{ClobClient, ClobClientConfig};
pub use history::ClobPriceHistory;
