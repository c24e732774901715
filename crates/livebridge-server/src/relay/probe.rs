//! Advisory upstream health probe.
//!
//! Periodically inspects the upstream connection state and logs when it
//! looks unhealthy. Purely observational: it never panics on a connector
//! without introspection and never triggers reconnection itself.

use std::sync::Arc;
use std::time::Duration;

use livebridge_upstream::UpstreamState;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::session::RelaySession;

/// Run the probe loop until the session's token cancels.
pub async fn run_probe(session: Arc<RelaySession>, interval: Duration, cancel: CancellationToken) {
    let mut ticker = time::interval(interval);
    // The immediate first tick would probe before anything could degrade.
    let _ = ticker.tick().await;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match session.upstream_state().await {
                    None => {
                        // No handle or no introspection: unknown, not unhealthy.
                        debug!(identifier = %session.identifier(), "upstream state unavailable");
                        session.set_probe_degraded(false);
                    }
                    Some(UpstreamState::Connected) => {
                        session.set_probe_degraded(false);
                    }
                    Some(state @ (UpstreamState::Degraded | UpstreamState::Disconnected)) => {
                        warn!(
                            identifier = %session.identifier(),
                            state = ?state,
                            "upstream connection looks unhealthy"
                        );
                        session.set_probe_degraded(true);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelayConfig;
    use crate::websocket::connection::ClientConnection;
    use livebridge_core::ChannelId;
    use livebridge_upstream::ScriptedConnector;
    use tokio::sync::mpsc;

    async fn live_session(connector: &ScriptedConnector) -> Arc<RelaySession> {
        connector.add_room("alice", "123");
        let (tx, _rx) = mpsc::channel(8);
        let client = Arc::new(ClientConnection::new(ChannelId::from("chan_p"), tx));
        let session = Arc::new(RelaySession::new(
            "alice".into(),
            client,
            Arc::new(connector.clone()),
            RelayConfig {
                probe_enabled: false,
                ..RelayConfig::default()
            },
        ));
        session.clone().open().await;
        session
    }

    #[tokio::test]
    async fn probe_flags_degraded_upstream() {
        let connector = ScriptedConnector::new();
        let session = live_session(&connector).await;
        connector.set_reported_state(Some(UpstreamState::Degraded));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_probe(
            session.clone(),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(session.probe_degraded());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn probe_clears_flag_when_healthy_again() {
        let connector = ScriptedConnector::new();
        let session = live_session(&connector).await;
        connector.set_reported_state(Some(UpstreamState::Disconnected));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_probe(
            session.clone(),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(session.probe_degraded());

        connector.set_reported_state(Some(UpstreamState::Connected));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!session.probe_degraded());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn probe_survives_connector_without_introspection() {
        let connector = ScriptedConnector::new();
        let session = live_session(&connector).await;
        connector.set_reported_state(None);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_probe(
            session.clone(),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!session.probe_degraded());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn probe_stops_on_cancel() {
        let connector = ScriptedConnector::new();
        let session = live_session(&connector).await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_probe(
            session,
            Duration::from_secs(300),
            cancel.clone(),
        ));

        cancel.cancel();
        // Must return promptly even with a huge interval.
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("probe did not stop on cancel")
            .unwrap();
    }
}
