//! CLOB API Response Types
//!
//! Defines the serialization types for the public Polymarket CLOB
//! REST endpoints used by the series pipeline.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::series::Observation;

/// Response from `GET /prices-history`.
///
/// Entries are kept as raw JSON so one malformed element cannot fail
/// the whole batch; see [`PricesHistoryResponse::into_observations`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PricesHistoryResponse {
  /// List of `{ "t": <unix s>, "p": <price> }` entries.
  #[serde(default)]
  pub history: Vec<Value>,
}

impl PricesHistoryResponse {
  /// Decode every entry into an `Observation`.
  ///
  /// Entries that are not objects decode to a NaN observation, which
  /// the normalizer then drops. The batch length is preserved.
  pub fn into_observations(self) -> Vec<Observation> {
    self
      .history
      .into_iter()
      .map(|raw| {
        serde_json::from_value::<Observation>(raw)
          .unwrap_or(Observation::new(f64::NAN, f64::NAN))
      })
      .collect()
  }
}

/// Query parameters for `GET /prices-history`.
#[derive(Debug, Clone)]
pub struct PricesHistoryQuery<'a> {
  /// Outcome token ID.
  pub market: &'a str,
  /// Lookback window (1h, 6h, 1d, 1w, max).
  pub interval: &'a str,
  /// Resolution in minutes.
  pub fidelity: u32,
}

impl PricesHistoryQuery<'_> {
  /// Encode as a request path with query string.
  pub fn to_path(&self) -> String {
    format!(
      "/prices-history?market={}&interval={}&fidelity={}",
      self.market, self.interval, self.fidelity
    )
  }
}
