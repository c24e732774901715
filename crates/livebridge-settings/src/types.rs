//! Settings type tree.

use serde::{Deserialize, Serialize};

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LivebridgeSettings {
    /// Network and channel settings.
    pub server: ServerSettings,
    /// Relay session behavior.
    pub relay: RelaySettings,
}

/// Server network settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` auto-assigns).
    pub port: u16,
    /// Maximum concurrent client channels.
    pub max_connections: usize,
    /// Ping interval for client liveness, in seconds.
    pub heartbeat_interval_secs: u64,
    /// How long a client may go silent before being dropped, in seconds.
    pub heartbeat_timeout_secs: u64,
    /// Maximum inbound WebSocket message size in bytes.
    pub max_message_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_connections: 50,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            max_message_size: 64 * 1024,
        }
    }
}

/// Relay session behavior settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelaySettings {
    /// Reconnection attempts before giving up and asking the client to
    /// reconnect manually.
    pub max_reconnect_attempts: u32,
    /// Fixed wait before each reconnection attempt, in seconds.
    pub reconnect_delay_secs: u64,
    /// Upstream health probe cadence, in seconds.
    pub probe_interval_secs: u64,
    /// Whether the advisory health probe runs at all.
    pub probe_enabled: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            max_reconnect_attempts: 3,
            reconnect_delay_secs: 5,
            probe_interval_secs: 30,
            probe_enabled: true,
        }
    }
}
