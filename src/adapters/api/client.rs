//! CLOB HTTP Client - Concurrency-bounded REST API Client
//!
//! Wraps reqwest with a request timeout and a semaphore bounding
//! in-flight requests to the public Polymarket CLOB REST API.
//! Requests are issued once; there is no retry loop.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::config::ApiConfig;

/// Configuration for the CLOB HTTP client.
#[derive(Debug, Clone)]
pub struct ClobClientConfig {
  /// Base URL for the CLOB API.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
  /// Maximum concurrent requests.
  pub max_concurrent: usize,
}

impl Default for ClobClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://clob.polymarket.com".to_string(),
      timeout: Duration::from_secs(30),
      max_concurrent: 10,
    }
  }
}

impl From<&ApiConfig> for ClobClientConfig {
  fn from(api: &ApiConfig) -> Self {
    Self {
      base_url: api.clob_url.trim_end_matches('/').to_string(),
      timeout: Duration::from_secs(api.timeout_seconds),
      max_concurrent: api.max_concurrent,
    }
  }
}

/// HTTP client for the Polymarket CLOB API.
pub struct ClobClient {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: ClobClientConfig,
  /// Concurrency limiter.
  semaphore: Arc<Semaphore>,
}

impl ClobClient {
  /// Create a new CLOB client.
  pub fn new(config: ClobClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent));

    Ok(Self {
      http,
      config,
      semaphore,
    })
  }

  /// Base URL requests are issued against.
  pub fn base_url(&self) -> &str {
    &self.config.base_url
  }

  /// Execute a GET request and decode the JSON body.
  ///
  /// Non-2xx responses are returned as errors carrying status and body.
  pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let _permit = self
      .semaphore
      .acquire()
      .await
      .context("Semaphore closed")?;

    let url = format!("{}{}", self.config.base_url, path);
    debug!(url = %url, "GET");

    let response = self
      .http
      .get(&url)
      .send()
      .await
      .with_context(|| format!("Request to {path} failed"))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(anyhow::anyhow!("API error {status}: {body}"));
    }

    response
      .json::<T>()
      .await
      .with_context(|| format!("Invalid JSON from {path}"))
  }
}
