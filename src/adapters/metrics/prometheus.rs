//! Prometheus Metrics Registry - Series Pipeline Observability
//!
//! Registers the series metrics exposed on `/metrics`: tick outcomes,
//! series length, observations dropped during normalization, history
//! loads and feed connectivity.

use prometheus::{Encoder, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};

use crate::domain::series::TickOutcome;

/// Centralized Prometheus metrics for the series service.
///
/// All metrics follow the naming convention `price_series_*` and carry
/// a `subject` label matching the configured subject name.
pub struct SeriesMetrics {
    /// Prometheus registry.
    registry: Registry,
    /// Ticks seen, by subject and outcome (appended/replaced/stale/invalid/lagged).
    pub ticks: IntCounterVec,
    /// Current number of points per subject.
    pub series_points: IntGaugeVec,
    /// Historical observations dropped as malformed.
    pub observations_dropped: IntCounterVec,
    /// History loads, by subject and status (ok/error).
    pub history_loads: IntCounterVec,
    /// Feed connection status (1 = connected, 0 = disconnected).
    pub feed_connected: IntGauge,
}

impl SeriesMetrics {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let ticks = IntCounterVec::new(
            Opts::new("price_series_ticks_total", "Live ticks processed by outcome"),
            &["subject", "outcome"],
        )?;

        let series_points = IntGaugeVec::new(
            Opts::new("price_series_points", "Points currently held per series"),
            &["subject"],
        )?;

        let observations_dropped = IntCounterVec::new(
            Opts::new(
                "price_series_observations_dropped_total",
                "Historical observations dropped for non-finite fields",
            ),
            &["subject"],
        )?;

        let history_loads = IntCounterVec::new(
            Opts::new("price_series_history_loads_total", "History fetches by status"),
            &["subject", "status"],
        )?;

        let feed_connected = IntGauge::new(
            "price_series_feed_connected",
            "Feed connection status (1=connected, 0=disconnected)",
        )?;

        // Register all metrics
        registry.register(Box::new(ticks.clone()))?;
        registry.register(Box::new(series_points.clone()))?;
        registry.register(Box::new(observations_dropped.clone()))?;
        registry.register(Box::new(history_loads.clone()))?;
        registry.register(Box::new(feed_connected.clone()))?;

        Ok(Self {
            registry,
            ticks,
            series_points,
            observations_dropped,
            history_loads,
            feed_connected,
        })
    }

    /// Count one processed tick.
    pub fn record_tick(&self, subject: &str, outcome: TickOutcome) {
        self.ticks
            .with_label_values(&[subject, outcome.as_str()])
            .inc();
    }

    /// Count ticks the tracker missed because its receiver lagged.
    pub fn record_lagged(&self, subject: &str, missed: u64) {
        self.ticks
            .with_label_values(&[subject, "lagged"])
            .inc_by(missed);
    }

    /// Publish the current series length.
    pub fn set_points(&self, subject: &str, len: usize) {
        self.series_points
            .with_label_values(&[subject])
            .set(i64::try_from(len).unwrap_or(i64::MAX));
    }

    /// Count a finished history load and the entries it dropped.
    pub fn record_history(&self, subject: &str, ok: bool, dropped: usize) {
        let status = if ok { "ok" } else { "error" };
        self.history_loads.with_label_values(&[subject, status]).inc();
        if dropped > 0 {
            self.observations_dropped
                .with_label_values(&[subject])
                .inc_by(dropped as u64);
        }
    }

    /// Render the registry in the Prometheus text format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_renders() {
        let metrics = SeriesMetrics::new().unwrap();
        metrics.record_tick("btc-yes", TickOutcome::Appended);
        metrics.record_tick("btc-yes", TickOutcome::Appended);
        metrics.record_tick("btc-yes", TickOutcome::Stale);
        metrics.set_points("btc-yes", 42);
        metrics.record_history("btc-yes", true, 3);
        metrics.record_lagged("btc-yes", 7);

        assert_eq!(
            metrics
                .ticks
                .with_label_values(&["btc-yes", "appended"])
                .get(),
            2
        );
        assert_eq!(
            metrics.ticks.with_label_values(&["btc-yes", "lagged"]).get(),
            7
        );
        assert_eq!(metrics.series_points.with_label_values(&["btc-yes"]).get(), 42);

        let text = metrics.render().unwrap();
        assert!(text.contains("price_series_ticks_total"));
        assert!(text.contains("price_series_observations_dropped_total{subject=\"btc-yes\"} 3"));
    }
}
