//! Health Check Server - Liveness, Readiness and Metrics
//!
//! Exposes /live, /ready and /metrics via axum 0.7. Readiness follows
//! the tick feed connection.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use super::prometheus::SeriesMetrics;
use crate::ports::tick_feed::TickFeed;

/// Shared state behind the health endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Live tick feed; readiness mirrors its health.
    pub feed: Arc<dyn TickFeed>,
    /// Metrics rendered on /metrics.
    pub metrics: Arc<SeriesMetrics>,
}

impl HealthState {
    /// Check if the system is ready to serve traffic.
    pub async fn is_ready(&self) -> bool {
        let ready = self.feed.is_healthy().await;
        self.metrics.feed_connected.set(i64::from(ready));
        ready
    }
}

/// Axum-based health check HTTP server.
pub struct HealthServer {
    /// Health state shared with all components.
    state: HealthState,
    /// Bind address (default 0.0.0.0:9090 from config).
    bind_address: String,
}

impl HealthServer {
    /// Create a new health server.
    pub fn new(state: HealthState, bind_address: impl Into<String>) -> Self {
        Self {
            state,
            bind_address: bind_address.into(),
        }
    }

    /// Build the router without binding a socket.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .route("/metrics", get(Self::metrics))
            .with_state(self.state.clone())
    }

    /// Serve until shutdown.
    #[instrument(skip(self, shutdown_rx), fields(address = %self.bind_address))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;

        info!("Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    /// Liveness probe: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness probe: returns 200 only while the tick feed is connected.
    async fn readiness(State(state): State<HealthState>) -> impl IntoResponse {
        if state.is_ready().await {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }

    /// Prometheus text exposition.
    async fn metrics(State(state): State<HealthState>) -> impl IntoResponse {
        match state.metrics.render() {
            Ok(body) => (StatusCode::OK, body),
            Err(e) => {
                error!(error = %e, "Failed to render metrics");
                (StatusCode::INTERNAL_SERVER_ERROR, String::new())
            }
        }
    }
}
