//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml`. Endpoint URLs,
//! history granularity, and the tracked subjects are externalized here;
//! nothing is hardcoded in the domain layer.

pub mod loader;

use serde::Deserialize;

use crate::domain::series::Outcome;

/// Top-level service configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any task is spawned.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and logging.
  pub service: ServiceConfig,
  /// Polymarket API endpoints.
  pub api: ApiConfig,
  /// Price history request parameters.
  #[serde(default)]
  pub history: HistoryConfig,
  /// Outcome series to track.
  pub subjects: Vec<SubjectConfig>,
  /// Metrics and health endpoints.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// CLOB REST API base URL.
  #[serde(default = "default_clob_url")]
  pub clob_url: String,
  /// CLOB market-channel WebSocket URL.
  #[serde(default = "default_ws_url")]
  pub ws_url: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Maximum concurrent history requests.
  #[serde(default = "default_max_concurrent")]
  pub max_concurrent: usize,
}

/// `/prices-history` query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
  /// Lookback window (1h, 6h, 1d, 1w, max).
  #[serde(default = "default_interval")]
  pub interval: String,
  /// Resolution in minutes.
  #[serde(default = "default_fidelity")]
  pub fidelity: u32,
}

impl Default for HistoryConfig {
  fn default() -> Self {
    Self {
      interval: default_interval(),
      fidelity: default_fidelity(),
    }
  }
}

/// One charted outcome.
///
/// `token_id` is the token whose trades are streamed. With
/// `outcome = "no"` the series is the complement of that token's prices,
/// so a single YES token can drive both sides of a market.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectConfig {
  /// Human-readable subject name, used as the metrics label.
  pub name: String,
  /// Outcome token to fetch history and ticks for.
  pub token_id: String,
  /// Which side of the market to chart.
  #[serde(default = "default_outcome")]
  pub outcome: Outcome,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable the metrics/health server.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: default_true(),
      bind_address: default_metrics_addr(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_clob_url() -> String {
  "https://clob.polymarket.com".to_string()
}

fn default_ws_url() -> String {
  "wss://ws-subscriptions-clob.polymarket.com/ws/market".to_string()
}

fn default_timeout() -> u64 {
  30
}

fn default_max_concurrent() -> usize {
  10
}

fn default_interval() -> String {
  "1d".to_string()
}

fn default_fidelity() -> u32 {
  5
}

const fn default_outcome() -> Outcome {
  Outcome::Yes
}

fn default_true() -> bool {
  true
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}
