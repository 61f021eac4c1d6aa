//! Polymarket Price Series — Entry Point
//!
//! Initializes configuration and logging, then keeps one live chart
//! series per configured subject until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create ClobClient + price history source
//! 4. Create the Polymarket tick feed for every subject token
//! 5. Spawn health/metrics server (/live, /ready, /metrics)
//! 6. Spawn one SeriesTracker per subject
//! 7. Spawn the tick feed session
//! 8. Wait for SIGINT → broadcast shutdown → bounded joins

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use polymarket_price_series::adapters::api::{ClobClient, ClobClientConfig, ClobPriceHistory};
use polymarket_price_series::adapters::feeds::PolymarketTickFeed;
use polymarket_price_series::adapters::metrics::{HealthServer, HealthState, SeriesMetrics};
use polymarket_price_series::config;
use polymarket_price_series::domain::series::TokenId;
use polymarket_price_series::usecases::SeriesTracker;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config_path =
        std::env::var("PRICE_SERIES_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.service.log_level)),
        )
        .json()
        .init();

    info!(
        name = %config.service.name,
        version = env!("CARGO_PKG_VERSION"),
        subjects = config.subjects.len(),
        "Starting Polymarket price series service"
    );

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let metrics = Arc::new(SeriesMetrics::new().context("Failed to register metrics")?);

    // ── 3. History source ───────────────────────────────────
    let clob_client = Arc::new(
        ClobClient::new(ClobClientConfig::from(&config.api))
            .context("Failed to create CLOB client")?,
    );
    let history = Arc::new(ClobPriceHistory::new(
        Arc::clone(&clob_client),
        config.history.clone(),
    ));

    // ── 4. Tick feed for every distinct token ───────────────
    let mut token_ids: Vec<TokenId> = config.subjects.iter().map(|s| s.token_id.clone()).collect();
    token_ids.sort();
    token_ids.dedup();
    let feed = Arc::new(PolymarketTickFeed::new(config.api.ws_url.clone(), &token_ids));

    // ── 5. Health / metrics server ──────────────────────────
    let health_handle = if config.metrics.enabled {
        let server = HealthServer::new(
            HealthState {
                feed: feed.clone(),
                metrics: Arc::clone(&metrics),
            },
            config.metrics.bind_address.clone(),
        );
        let health_shutdown = shutdown_tx.subscribe();
        Some(tokio::spawn(async move {
            if let Err(e) = server.run(health_shutdown).await {
                error!(error = %e, "Health server failed");
            }
        }))
    } else {
        None
    };

    // ── 6. One tracker per subject ──────────────────────────
    let mut tracker_handles = Vec::with_capacity(config.subjects.len());
    for subject in &config.subjects {
        let tracker = SeriesTracker::new(
            subject.clone(),
            Arc::clone(&history),
            Arc::clone(&feed),
            Arc::clone(&metrics),
        );
        let name = subject.name.clone();
        let tracker_shutdown = shutdown_tx.subscribe();
        tracker_handles.push(tokio::spawn(async move {
            match tracker.run(tracker_shutdown).await {
                Ok(series) => info!(subject = %name, points = series.len(), "Tracker stopped"),
                Err(e) => error!(subject = %name, error = %e, "Tracker failed"),
            }
        }));
    }

    // ── 7. Tick feed session ────────────────────────────────
    let feed_shutdown = shutdown_tx.subscribe();
    let feed_ref = Arc::clone(&feed);
    let feed_handle = tokio::spawn(async move {
        if let Err(e) = feed_ref.run(feed_shutdown).await {
            error!(error = %e, "Tick feed stopped; series will no longer advance");
        }
    });

    info!("All tasks spawned — service is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c().await.context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    let _ = shutdown_tx.send(());

    for handle in tracker_handles {
        if tokio::time::timeout(Duration::from_secs(5), handle).await.is_err() {
            warn!("Tracker did not stop within 5s");
        }
    }

    let _ = tokio::time::timeout(Duration::from_secs(5), feed_handle).await;

    if let Some(handle) = health_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }

    info!("Shutdown complete");
    Ok(())
}
