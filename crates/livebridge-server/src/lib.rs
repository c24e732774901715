//! # livebridge-server
//!
//! Axum HTTP + `WebSocket` server and the relay core.
//!
//! - HTTP endpoints: health check, Prometheus metrics
//! - `WebSocket` gateway: one channel per client, command parsing, ping/pong
//!   liveness, implicit disconnect on channel close
//! - Relay sessions: upstream lifecycle, event normalization, error
//!   classification, bounded reconnection, advisory health probe
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod metrics;
pub mod registry;
pub mod relay;
pub mod server;
pub mod shutdown;
pub mod websocket;
