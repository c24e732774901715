//! Relay core: upstream session lifecycle, payload normalization, bounded
//! reconnection, and the advisory health probe.

pub mod normalize;
pub mod probe;
pub mod session;

use std::time::Duration;

use livebridge_settings::RelaySettings;

/// Relay session behavior knobs.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Reconnection attempts before giving up.
    pub max_reconnect_attempts: u32,
    /// Fixed wait before each reconnection attempt.
    pub reconnect_delay: Duration,
    /// Upstream health probe cadence.
    pub probe_interval: Duration,
    /// Whether the advisory health probe runs.
    pub probe_enabled: bool,
}

impl RelayConfig {
    /// Build a config from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &RelaySettings) -> Self {
        Self {
            max_reconnect_attempts: settings.max_reconnect_attempts,
            reconnect_delay: Duration::from_secs(settings.reconnect_delay_secs),
            probe_interval: Duration::from_secs(settings.probe_interval_secs),
            probe_enabled: settings.probe_enabled,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::from_settings(&RelaySettings::default())
    }
}
