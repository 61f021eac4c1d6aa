//! Series Tracker - Single-writer Live Chart Series
//!
//! Owns the chart series of one subject (an outcome token, charted as
//! YES or NO) for its whole lifetime:
//! 1. Subscribes to the subject's ticks before loading history
//! 2. Fetches and normalizes the historical batch
//! 3. Derives the inverse series when charting the NO side
//! 4. Folds each live tick into the series and publishes snapshots
//!
//! The tracker task is the only writer of its series, so ticks are
//! merged strictly in arrival order. Readers hold a `watch::Receiver`
//! and always see a complete, ordered snapshot.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::adapters::metrics::SeriesMetrics;
use crate::config::SubjectConfig;
use crate::domain::inverse::derive_inverse;
use crate::domain::normalize::{count_invalid, normalize};
use crate::domain::series::{Outcome, Series, Tick, TickOutcome};
use crate::ports::price_history::PriceHistory;
use crate::ports::tick_feed::{TickEvent, TickFeed};

/// Live series for one subject.
pub struct SeriesTracker<H: PriceHistory, F: TickFeed> {
  /// What is being charted.
  subject: SubjectConfig,
  /// Historical batch source.
  history: Arc<H>,
  /// Live tick source.
  feed: Arc<F>,
  /// Shared metrics registry.
  metrics: Arc<SeriesMetrics>,
  /// Canonical series, written only by this tracker.
  series: Series,
  /// Snapshot publisher.
  series_tx: watch::Sender<Series>,
}

impl<H: PriceHistory, F: TickFeed> SeriesTracker<H, F> {
  /// Create a tracker with an empty series.
  pub fn new(
    subject: SubjectConfig,
    history: Arc<H>,
    feed: Arc<F>,
    metrics: Arc<SeriesMetrics>,
  ) -> Self {
    let (series_tx, _) = watch::channel(Series::new());
    Self {
      subject,
      history,
      feed,
      metrics,
      series: Series::new(),
      series_tx,
    }
  }

  /// Subscribe to published snapshots.
  pub fn snapshot(&self) -> watch::Receiver<Series> {
    self.series_tx.subscribe()
  }

  /// Current series.
  pub fn series(&self) -> &Series {
    &self.series
  }

  /// Subject this tracker charts.
  pub fn subject(&self) -> &SubjectConfig {
    &self.subject
  }

  /// Replace the series with the normalized history batch.
  ///
  /// For a NO subject the history of the streamed token is inverted.
  #[instrument(skip(self), fields(subject = %self.subject.name, outcome = %self.subject.outcome))]
  pub async fn load_history(&mut self) -> Result<()> {
    let name = self.subject.name.as_str();

    let observations = match self.history.fetch_history(&self.subject.token_id).await {
      Ok(obs) => obs,
      Err(e) => {
        self.metrics.record_history(name, false, 0);
        return Err(e).with_context(|| format!("Failed to load history for {name}"));
      }
    };

    let dropped = count_invalid(&observations);
    let normalized = normalize(observations);
    self.series = match self.subject.outcome {
      Outcome::Yes => normalized,
      Outcome::No => derive_inverse(&normalized),
    };

    self.metrics.record_history(name, true, dropped);
    self.publish();

    info!(
      points = self.series.len(),
      dropped,
      first = ?self.series.first().and_then(|p| p.datetime()),
      last = ?self.series.last().and_then(|p| p.datetime()),
      "History loaded"
    );

    Ok(())
  }

  /// Fold one tick for the streamed token into the series.
  ///
  /// NO subjects see the complement of the token's price.
  pub fn apply(&mut self, tick: Tick) -> TickOutcome {
    let tick = match self.subject.outcome {
      Outcome::Yes => tick,
      Outcome::No => tick.complement(),
    };

    let outcome = self.series.apply_tick(tick);
    self.metrics.record_tick(&self.subject.name, outcome);

    if outcome.is_accepted() {
      self.publish();
    } else {
      debug!(
        subject = %self.subject.name,
        outcome = %outcome,
        time = tick.time,
        price = tick.price,
        tail = ?self.series.last().map(|p| p.time),
        "Tick rejected"
      );
    }

    outcome
  }

  /// Run the tracker until shutdown or until the feed closes.
  ///
  /// Returns the final series. A history failure aborts the run; there
  /// is no retry.
  #[instrument(skip(self, shutdown_rx), name = "series_tracker", fields(subject = %self.subject.name))]
  pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<Series> {
    // Subscribe first so ticks arriving during the history fetch are kept.
    let mut ticks = self.feed.subscribe(&self.subject.token_id).await;

    self.load_history().await?;

    loop {
      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!(points = self.series.len(), "Shutdown signal received, stopping tracker");
          break;
        }
        event = ticks.recv() => {
          match event {
            Ok(event) => self.handle_event(event),
            Err(broadcast::error::RecvError::Lagged(n)) => {
              warn!(dropped = n, "Tracker lagged behind tick feed");
              self.metrics.record_lagged(&self.subject.name, n);
            }
            Err(broadcast::error::RecvError::Closed) => {
              info!("Tick channel closed");
              break;
            }
          }
        }
      }
    }

    Ok(self.series)
  }

  fn handle_event(&mut self, event: TickEvent) {
    if event.token_id != self.subject.token_id {
      debug!(token_id = %event.token_id, "Ignoring tick for another token");
      return;
    }
    self.apply(event.tick);
  }

  fn publish(&self) {
    self.metrics.set_points(&self.subject.name, self.series.len());
    // `send_replace` stores the value even with no receivers
    self.series_tx.send_replace(self.series.clone());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use rust_decimal_macros::dec;

  use crate::domain::series::{Observation, Point, TokenId};

  struct FixedHistory(Vec<Observation>);

  #[async_trait]
  impl PriceHistory for FixedHistory {
    async fn fetch_history(&self, _token_id: &TokenId) -> Result<Vec<Observation>> {
      Ok(self.0.clone())
    }
  }

  struct ChannelFeed(broadcast::Sender<TickEvent>);

  #[async_trait]
  impl TickFeed for ChannelFeed {
    async fn subscribe(&self, _token_id: &TokenId) -> broadcast::Receiver<TickEvent> {
      self.0.subscribe()
    }

    async fn is_healthy(&self) -> bool {
      true
    }
  }

  fn subject(outcome: Outcome) -> SubjectConfig {
    SubjectConfig {
      name: "test".to_string(),
      token_id: "111".to_string(),
      outcome,
    }
  }

  fn tracker(outcome: Outcome, history: Vec<Observation>) -> SeriesTracker<FixedHistory, ChannelFeed> {
    let (tx, _) = broadcast::channel(16);
    SeriesTracker::new(
      subject(outcome),
      Arc::new(FixedHistory(history)),
      Arc::new(ChannelFeed(tx)),
      Arc::new(SeriesMetrics::new().unwrap()),
    )
  }

  #[tokio::test]
  async fn test_load_history_yes() {
    let mut t = tracker(
      Outcome::Yes,
      vec![Observation::new(20.0, 0.5), Observation::new(10.0, 0.25)],
    );
    t.load_history().await.unwrap();
    assert_eq!(
      t.series().points(),
      &[Point::new(10.0, dec!(0.25)), Point::new(20.0, dec!(0.5))]
    );
    assert_eq!(*t.snapshot().borrow(), *t.series());
  }

  #[tokio::test]
  async fn test_no_subject_inverts_history_and_ticks() {
    let mut t = tracker(Outcome::No, vec![Observation::new(10.0, 0.25)]);
    t.load_history().await.unwrap();
    assert_eq!(t.series().points(), &[Point::new(10.0, dec!(0.75))]);

    assert_eq!(t.apply(Tick::new(11.0, 0.75)), TickOutcome::Appended);
    assert_eq!(t.series().last(), Some(&Point::new(11.0, dec!(0.25))));
  }

  #[tokio::test]
  async fn test_apply_publishes_only_accepted_ticks() {
    let mut t = tracker(Outcome::Yes, vec![Observation::new(10.0, 0.5)]);
    t.load_history().await.unwrap();
    let mut rx = t.snapshot();
    rx.borrow_and_update();

    assert_eq!(t.apply(Tick::new(5.0, 0.9)), TickOutcome::Stale);
    assert!(!rx.has_changed().unwrap());

    assert_eq!(t.apply(Tick::new(10.0, 0.75)), TickOutcome::Replaced);
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().last(), Some(&Point::new(10.0, dec!(0.75))));
  }

  #[tokio::test]
  async fn test_ignores_other_tokens() {
    let mut t = tracker(Outcome::Yes, Vec::new());
    t.handle_event(TickEvent {
      token_id: "999".to_string(),
      tick: Tick::new(1.0, 0.5),
    });
    assert!(t.series().is_empty());
  }
}
