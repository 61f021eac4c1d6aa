//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// History intervals accepted by `/prices-history`.
const INTERVALS: [&str; 6] = ["1m", "1h", "6h", "1d", "1w", "max"];

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    subjects = config.subjects.len(),
    interval = %config.history.interval,
    fidelity = config.history.fidelity,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Non-empty, uniquely named subjects with token IDs
/// - Known history interval and positive fidelity
/// - Usable endpoint URLs and timeouts
/// - Parsable metrics bind address
fn validate_config(config: &AppConfig) -> Result<()> {
  // Subject validation
  anyhow::ensure!(
    !config.subjects.is_empty(),
    "At least one subject must be configured"
  );

  let mut names = HashSet::new();
  for (i, subject) in config.subjects.iter().enumerate() {
    anyhow::ensure!(
      !subject.name.is_empty(),
      "Subject {} has an empty name",
      i
    );
    anyhow::ensure!(
      !subject.token_id.is_empty(),
      "Subject {} ({}) has empty token_id",
      i,
      subject.name
    );
    anyhow::ensure!(
      names.insert(subject.name.as_str()),
      "Subject name {} is configured twice",
      subject.name
    );
  }

  // History validation
  anyhow::ensure!(
    INTERVALS.contains(&config.history.interval.as_str()),
    "history.interval must be one of {:?}, got {}",
    INTERVALS,
    config.history.interval
  );
  anyhow::ensure!(
    config.history.fidelity > 0,
    "history.fidelity must be positive"
  );

  // API validation
  anyhow::ensure!(
    config.api.clob_url.starts_with("http"),
    "CLOB API URL must be http(s), got {}",
    config.api.clob_url
  );
  anyhow::ensure!(
    config.api.ws_url.starts_with("ws"),
    "WebSocket URL must be ws(s), got {}",
    config.api.ws_url
  );
  anyhow::ensure!(
    config.api.timeout_seconds > 0,
    "api.timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.api.max_concurrent > 0,
    "api.max_concurrent must be positive"
  );

  // Metrics validation
  if config.metrics.enabled {
    config
      .metrics
      .bind_address
      .parse::<SocketAddr>()
      .with_context(|| {
        format!("Invalid metrics bind_address: {}", config.metrics.bind_address)
      })?;
  }

  Ok(())
}
