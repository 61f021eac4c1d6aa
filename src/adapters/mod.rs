//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP clients, WebSockets, metrics export).
//! Each sub-module groups adapters by infrastructure concern.
//!
//! Adapter categories:
//! - `api`: Polymarket CLOB REST client and price history source
//! - `feeds`: Real-time tick feed (Polymarket WebSocket)
//! - `metrics`: Prometheus metrics export and health checks

pub mod api;
pub mod feeds;
pub mod metrics;
