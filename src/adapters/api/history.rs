//! Price History Adapter - `/prices-history` Client
//!
//! Implements the `PriceHistory` port against the public CLOB
//! endpoint. The raw batch is returned untouched; normalization
//! happens in the domain layer.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::client::ClobClient;
use super::types::{PricesHistoryQuery, PricesHistoryResponse};
use crate::config::HistoryConfig;
use crate::domain::series::{Observation, TokenId};
use crate::ports::price_history::PriceHistory;

/// CLOB-backed historical price source.
pub struct ClobPriceHistory {
  /// Shared HTTP client.
  client: Arc<ClobClient>,
  /// Interval and fidelity sent with every request.
  params: HistoryConfig,
}

impl ClobPriceHistory {
  /// Create a history source using the given client and query parameters.
  pub fn new(client: Arc<ClobClient>, params: HistoryConfig) -> Self {
    Self { client, params }
  }
}

#[async_trait]
impl PriceHistory for ClobPriceHistory {
  #[instrument(skip(self), fields(interval = %self.params.interval))]
  async fn fetch_history(&self, token_id: &TokenId) -> Result<Vec<Observation>> {
    let path = PricesHistoryQuery {
      market: token_id,
      interval: &self.params.interval,
      fidelity: self.params.fidelity,
    }
    .to_path();

    let response: PricesHistoryResponse = self.client.get_json(&path).await?;
    let observations = response.into_observations();

    debug!(count = observations.len(), "Price history fetched");
    Ok(observations)
  }
}
