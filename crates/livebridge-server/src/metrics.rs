//! Prometheus metrics recorder and metric name constants.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Must be called once at server startup before any metrics are recorded.
pub fn install_recorder() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install metrics recorder");
    info!("prometheus metrics recorder installed");
    handle
}

// Metric name constants to avoid typos across modules.

/// Client channels opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// Client channels closed total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Active client channels (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Live relay sessions (gauge).
pub const RELAY_SESSIONS_ACTIVE: &str = "relay_sessions_active";
/// Normalized events relayed to clients (counter, labels: kind).
pub const RELAY_EVENTS_TOTAL: &str = "relay_events_total";
/// Events dropped because the client channel was full or gone (counter).
pub const RELAY_EVENTS_DROPPED_TOTAL: &str = "relay_events_dropped_total";
/// Upstream errors by classification (counter, labels: kind).
pub const UPSTREAM_ERRORS_TOTAL: &str = "upstream_errors_total";
/// Reconnection attempts started (counter).
pub const RELAY_RECONNECT_ATTEMPTS_TOTAL: &str = "relay_reconnect_attempts_total";
/// Sessions that exhausted their reconnection budget (counter).
pub const RELAY_RECONNECT_EXHAUSTED_TOTAL: &str = "relay_reconnect_exhausted_total";
