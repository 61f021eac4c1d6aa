//! Polymarket CLOB WebSocket Feed — Live Trade Ticks
//!
//! Connects to the CLOB market channel, subscribes to the configured
//! outcome tokens, and turns `last_trade_price` events into `TickEvent`s
//! on per-token broadcast channels. Implements the `TickFeed` port so the
//! use-case layer never depends on transport details.
//!
//! Features:
//! - Per-token broadcast channels with 4096 buffer
//! - Application-level `PING` every 10s to keep the session open
//! - Event-driven via tokio::select! (NEVER polling)
//!
//! A session ends on the first transport error; `run` returns it and
//! reconnection is left to the caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, instrument, warn};

use crate::domain::series::{Tick, TokenId};
use crate::ports::tick_feed::{TickEvent, TickFeed};

/// Broadcast buffer per token.
const CHANNEL_CAPACITY: usize = 4096;

/// Keep-alive period for the market channel.
const PING_INTERVAL: Duration = Duration::from_secs(10);

/// One event object from the market channel.
///
/// Only `last_trade_price` events carry a tick; all fields are optional
/// so unrelated event types decode without error.
#[derive(Debug, Deserialize)]
struct WsEvent {
    #[serde(default)]
    event_type: String,
    #[serde(default)]
    asset_id: String,
    /// Trade price as a decimal string.
    #[serde(default)]
    price: Option<Value>,
    /// Server timestamp (Unix ms) as a string.
    #[serde(default)]
    timestamp: Option<Value>,
}

/// Subscription message for the market channel.
#[derive(Debug, serde::Serialize)]
struct SubscribeMessage<'a> {
    assets_ids: &'a [TokenId],
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Read a JSON number or numeric string.
fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decode one WebSocket text frame into tick events.
///
/// The server sends either a single event object or an array of them.
/// Events whose price or timestamp cannot be read still produce a tick
/// carrying NaN, so the series merger rejects and counts them.
pub fn parse_tick_events(text: &str) -> Result<Vec<TickEvent>> {
    let raw: Value = serde_json::from_str(text).context("Invalid Polymarket WS JSON")?;

    let objects = match raw {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => anyhow::bail!("Unexpected Polymarket WS frame: {other}"),
    };

    let events = objects
        .into_iter()
        .filter_map(|obj| serde_json::from_value::<WsEvent>(obj).ok())
        .filter(|e| e.event_type == "last_trade_price" && !e.asset_id.is_empty())
        .map(|e| {
            let price = number(e.price.as_ref()).unwrap_or(f64::NAN);
            let tick = match number(e.timestamp.as_ref()) {
                Some(ms) if ms.is_finite() && ms >= 0.0 => Tick::from_millis(ms as u64, price),
                _ => Tick::new(f64::NAN, price),
            };
            TickEvent {
                token_id: e.asset_id,
                tick,
            }
        })
        .collect();

    Ok(events)
}

/// Polymarket CLOB market-channel feed adapter.
pub struct PolymarketTickFeed {
    /// Per-token broadcast senders.
    channels: Arc<RwLock<HashMap<TokenId, broadcast::Sender<TickEvent>>>>,
    /// WebSocket URL from config.
    ws_url: String,
    /// Whether a session is currently open.
    connected: AtomicBool,
}

impl PolymarketTickFeed {
    /// Create a feed for the given tokens.
    ///
    /// The token set is sent once when the session opens; tokens
    /// subscribed later only receive ticks after the next `run`.
    pub fn new(ws_url: impl Into<String>, token_ids: &[TokenId]) -> Self {
        let channels = token_ids
            .iter()
            .map(|id| (id.clone(), broadcast::channel(CHANNEL_CAPACITY).0))
            .collect();

        Self {
            channels: Arc::new(RwLock::new(channels)),
            ws_url: ws_url.into(),
            connected: AtomicBool::new(false),
        }
    }

    /// Run one WebSocket session until shutdown or transport failure.
    #[instrument(skip(self, shutdown_rx), fields(url = %self.ws_url))]
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let result = self.connect_and_stream(&mut shutdown_rx).await;
        self.connected.store(false, Ordering::Relaxed);
        match &result {
            Ok(()) => info!("Polymarket feed shut down gracefully"),
            Err(e) => warn!(error = %e, "Polymarket feed session ended"),
        }
        result
    }

    /// Single WebSocket session: connect, subscribe, stream until error or shutdown.
    async fn connect_and_stream(&self, shutdown_rx: &mut broadcast::Receiver<()>) -> Result<()> {
        let (ws_stream, _) = connect_async(self.ws_url.as_str())
            .await
            .context("Polymarket WebSocket connection failed")?;

        let (mut write, mut read) = ws_stream.split();

        let token_ids: Vec<TokenId> = self.channels.read().await.keys().cloned().collect();
        let subscribe = serde_json::to_string(&SubscribeMessage {
            assets_ids: &token_ids,
            kind: "market",
        })?;
        write
            .send(Message::Text(subscribe))
            .await
            .context("Failed to send market subscription")?;

        self.connected.store(true, Ordering::Relaxed);
        info!(tokens = token_ids.len(), "Polymarket market channel connected");

        let mut ping = tokio::time::interval(PING_INTERVAL);
        ping.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal in Polymarket feed");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }
                _ = ping.tick() => {
                    write
                        .send(Message::Text("PING".to_string()))
                        .await
                        .context("Polymarket WS ping failed")?;
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.handle_message(&text).await;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            return Err(anyhow::anyhow!("Polymarket WS closed by server: {frame:?}"));
                        }
                        Some(Err(e)) => {
                            return Err(anyhow::anyhow!("Polymarket WS error: {e}"));
                        }
                        None => {
                            return Err(anyhow::anyhow!("Polymarket WS stream ended"));
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Broadcast every tick in a frame to its token's channel.
    async fn handle_message(&self, text: &str) {
        if text == "PONG" {
            return;
        }

        let events = match parse_tick_events(text) {
            Ok(events) => events,
            Err(e) => {
                debug!(error = %e, "Failed to parse Polymarket message");
                return;
            }
        };

        if events.is_empty() {
            return;
        }

        let channels = self.channels.read().await;
        for event in events {
            match channels.get(&event.token_id) {
                // Broadcast (ignore if no receivers)
                Some(tx) => {
                    let _ = tx.send(event);
                }
                None => debug!(token_id = %event.token_id, "Tick for unsubscribed token"),
            }
        }
    }
}

#[async_trait]
impl TickFeed for PolymarketTickFeed {
    async fn subscribe(&self, token_id: &TokenId) -> broadcast::Receiver<TickEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(token_id.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    async fn is_healthy(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}
