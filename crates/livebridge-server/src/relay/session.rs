//! Relay session lifecycle.
//!
//! One `RelaySession` per client channel. The session owns the upstream
//! handle, the reconnection counter, the in-progress flag, and the probe
//! task, and every task it spawns selects on the session's cancellation
//! token so `close()` tears the whole scope down — including a reconnect
//! attempt that is still in flight.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use livebridge_core::events::{
    ConnectedPayload, ErrorPayload, ReconnectedPayload, RelayEvent, CONNECT_FAILED_FALLBACK,
};
use livebridge_core::{classify_error, UpstreamErrorKind};
use livebridge_upstream::{
    LiveConnector, UpstreamControl, UpstreamEvent, UpstreamSession, UpstreamState,
};
use metrics::counter;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::normalize::normalize;
use super::probe::run_probe;
use super::RelayConfig;
use crate::metrics::{
    RELAY_EVENTS_DROPPED_TOTAL, RELAY_EVENTS_TOTAL, RELAY_RECONNECT_ATTEMPTS_TOTAL,
    RELAY_RECONNECT_EXHAUSTED_TOTAL, UPSTREAM_ERRORS_TOTAL,
};
use crate::websocket::connection::ClientConnection;

/// Terminal message once the reconnection budget is spent.
const RECONNECT_EXHAUSTED_MESSAGE: &str =
    "Lost the live stream and could not reconnect automatically; send a new connect request to resume";

/// Relay session lifecycle states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not yet dialing.
    Idle,
    /// Initial upstream dial in progress.
    Connecting,
    /// Relaying events.
    Connected,
    /// Automatic reconnection in progress.
    Reconnecting,
    /// Reconnection exhausted or connect rejected; waiting on the client.
    Failed,
    /// Torn down. Terminal.
    Closed,
}

/// One relay session: a single upstream connection feeding a single client
/// channel.
pub struct RelaySession {
    identifier: String,
    client: Arc<ClientConnection>,
    connector: Arc<dyn LiveConnector>,
    config: RelayConfig,
    cancel: CancellationToken,
    state: Mutex<SessionState>,
    /// Reconnection attempts since the last successful connect.
    attempts: AtomicU32,
    /// Guard: at most one reconnect task in flight.
    reconnecting: AtomicBool,
    /// Set once `close()` has run.
    closed: AtomicBool,
    /// Whether the probe task has been started for this session.
    probe_started: AtomicBool,
    /// Last probe verdict (advisory, for introspection).
    probe_degraded: AtomicBool,
    control: AsyncMutex<Option<Box<dyn UpstreamControl>>>,
}

impl RelaySession {
    /// Create a session for `identifier`, relaying to `client`.
    pub fn new(
        identifier: String,
        client: Arc<ClientConnection>,
        connector: Arc<dyn LiveConnector>,
        config: RelayConfig,
    ) -> Self {
        Self {
            identifier,
            client,
            connector,
            config,
            cancel: CancellationToken::new(),
            state: Mutex::new(SessionState::Idle),
            attempts: AtomicU32::new(0),
            reconnecting: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            probe_started: AtomicBool::new(false),
            probe_degraded: AtomicBool::new(false),
            control: AsyncMutex::new(None),
        }
    }

    /// The stream target this session relays.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Reconnection attempts since the last successful connect.
    pub fn reconnect_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Whether the probe has flagged the upstream as degraded.
    pub fn probe_degraded(&self) -> bool {
        self.probe_degraded.load(Ordering::Relaxed)
    }

    pub(crate) fn set_probe_degraded(&self, degraded: bool) {
        self.probe_degraded.store(degraded, Ordering::Relaxed);
    }

    /// Best-effort upstream state for the probe.
    ///
    /// `None` when there is no live handle or the connector has no
    /// introspection — never an error.
    pub async fn upstream_state(&self) -> Option<UpstreamState> {
        self.control.lock().await.as_ref().and_then(|c| c.state())
    }

    fn set_state(&self, next: SessionState) {
        *self.state.lock() = next;
    }

    /// Establish the upstream connection and start relaying.
    ///
    /// Emits a `connected` envelope either way. A connectivity-classified
    /// failure starts the bounded reconnection procedure; any other failure
    /// leaves the session in `Failed` awaiting a fresh client connect.
    pub async fn open(self: Arc<Self>) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.set_state(SessionState::Connecting);
        info!(identifier = %self.identifier, channel = %self.client.id, "opening upstream session");

        match self.connector.connect(&self.identifier).await {
            Ok(upstream) => {
                if let Some(events) = self.adopt_upstream(upstream, None).await {
                    self.attempts.store(0, Ordering::SeqCst);
                    Self::spawn_pump(&self, events);
                    Self::spawn_probe_once(&self);
                }
            }
            Err(e) => {
                let message = non_empty_message(&e.to_string());
                warn!(identifier = %self.identifier, error = %message, "upstream connect failed");
                let _ = self.client.send_event(&RelayEvent::Connected(ConnectedPayload {
                    success: false,
                    session_token: String::new(),
                    identifier: self.identifier.clone(),
                    error: Some(message.clone()),
                }));
                if classify_error(&message) == UpstreamErrorKind::Connectivity {
                    Self::begin_reconnect(&self);
                } else {
                    self.set_state(SessionState::Failed);
                }
            }
        }
    }

    /// Take ownership of a freshly connected upstream and emit the success
    /// envelope.
    ///
    /// `attempt` is `Some(n)` when this connect is reconnection attempt `n`,
    /// which selects the `reconnected` envelope over `connected`. Returns
    /// `None` when the session was closed while the dial was in flight —
    /// the fresh handle is torn down and nothing is emitted.
    async fn adopt_upstream(
        &self,
        upstream: UpstreamSession,
        attempt: Option<u32>,
    ) -> Option<mpsc::Receiver<UpstreamEvent>> {
        if self.cancel.is_cancelled() {
            let mut control = upstream.control;
            if let Err(e) = control.disconnect().await {
                debug!(identifier = %self.identifier, error = %e, "discarding upstream after close");
            }
            return None;
        }

        let UpstreamSession {
            room,
            events,
            control,
        } = upstream;
        *self.control.lock().await = Some(control);
        self.set_state(SessionState::Connected);

        let envelope = match attempt {
            None => RelayEvent::Connected(ConnectedPayload {
                success: true,
                session_token: room.room_id.clone(),
                identifier: self.identifier.clone(),
                error: None,
            }),
            Some(n) => RelayEvent::Reconnected(ReconnectedPayload {
                success: true,
                session_token: room.room_id.clone(),
                attempt_number: n,
            }),
        };
        let _ = self.client.send_event(&envelope);
        info!(
            identifier = %self.identifier,
            room = %room.room_id,
            reconnect = attempt.is_some(),
            "upstream session live"
        );
        Some(events)
    }

    fn spawn_pump(session: &Arc<Self>, mut events: mpsc::Receiver<UpstreamEvent>) {
        let session = Arc::clone(session);
        drop(tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = session.cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Some(UpstreamEvent::Error { message }) => Self::on_error(&session, &message),
                        Some(event) => session.relay(&event),
                        None => {
                            debug!(identifier = %session.identifier, "upstream event stream ended");
                            break;
                        }
                    },
                }
            }
        }));
    }

    /// Start the advisory health probe, once per session lifetime.
    fn spawn_probe_once(session: &Arc<Self>) {
        if !session.config.probe_enabled || session.probe_started.swap(true, Ordering::SeqCst) {
            return;
        }
        let probe_session = Arc::clone(session);
        let interval = session.config.probe_interval;
        let cancel = session.cancel.clone();
        drop(tokio::spawn(async move {
            run_probe(probe_session, interval, cancel).await;
        }));
    }

    /// Normalize and forward one upstream event.
    ///
    /// Malformed payloads normalize to `None` and nothing is emitted.
    fn relay(&self, event: &UpstreamEvent) {
        let Some(relay_event) = normalize(event) else {
            return;
        };
        if self.client.send_event(&relay_event) {
            counter!(RELAY_EVENTS_TOTAL, "kind" => relay_event.wire_type()).increment(1);
        } else {
            counter!(RELAY_EVENTS_DROPPED_TOTAL).increment(1);
        }
    }

    /// Dispatch upstream error text by classification.
    pub fn on_error(session: &Arc<Self>, message: &str) {
        match classify_error(message) {
            // Known connector parse noise: nothing happens, not even a log.
            UpstreamErrorKind::Benign => {}
            UpstreamErrorKind::Connectivity => {
                warn!(identifier = %session.identifier, error = message, "upstream connectivity error");
                counter!(UPSTREAM_ERRORS_TOTAL, "kind" => "connectivity").increment(1);
                Self::begin_reconnect(session);
            }
            UpstreamErrorKind::Fatal => {
                error!(identifier = %session.identifier, error = message, "fatal upstream error");
                counter!(UPSTREAM_ERRORS_TOTAL, "kind" => "fatal").increment(1);
                let _ = session.client.send_event(&RelayEvent::Error(ErrorPayload {
                    message: message.to_owned(),
                    needs_manual_reconnect: None,
                }));
            }
            UpstreamErrorKind::Other => {
                warn!(identifier = %session.identifier, error = message, "upstream error");
                counter!(UPSTREAM_ERRORS_TOTAL, "kind" => "other").increment(1);
                let _ = session.client.send_event(&RelayEvent::Error(ErrorPayload {
                    message: message.to_owned(),
                    needs_manual_reconnect: None,
                }));
            }
        }
    }

    /// Start the reconnection procedure unless one is already in flight or
    /// the session is beyond saving.
    fn begin_reconnect(session: &Arc<Self>) {
        if session.closed.load(Ordering::SeqCst) {
            return;
        }
        if matches!(session.state(), SessionState::Failed | SessionState::Closed) {
            return;
        }
        if session.reconnecting.swap(true, Ordering::SeqCst) {
            return;
        }
        session.set_state(SessionState::Reconnecting);
        let session = Arc::clone(session);
        drop(tokio::spawn(async move {
            session.run_reconnect().await;
        }));
    }

    /// The reconnection loop: fixed delay, bounded attempts, one terminal
    /// error at exhaustion. No backoff growth.
    async fn run_reconnect(self: Arc<Self>) {
        loop {
            if self.attempts.load(Ordering::SeqCst) >= self.config.max_reconnect_attempts {
                self.reconnecting.store(false, Ordering::SeqCst);
                self.fail_terminal();
                return;
            }
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            counter!(RELAY_RECONNECT_ATTEMPTS_TOTAL).increment(1);
            info!(
                identifier = %self.identifier,
                attempt,
                max = self.config.max_reconnect_attempts,
                "reconnecting to upstream"
            );

            tokio::select! {
                () = self.cancel.cancelled() => {
                    self.reconnecting.store(false, Ordering::SeqCst);
                    return;
                }
                () = tokio::time::sleep(self.config.reconnect_delay) => {}
            }

            match self.connector.connect(&self.identifier).await {
                Ok(upstream) => {
                    if let Some(events) = self.adopt_upstream(upstream, Some(attempt)).await {
                        self.attempts.store(0, Ordering::SeqCst);
                        Self::spawn_pump(&self, events);
                    }
                    self.reconnecting.store(false, Ordering::SeqCst);
                    return;
                }
                Err(e) => {
                    warn!(identifier = %self.identifier, attempt, error = %e, "reconnect attempt failed");
                }
            }
        }
    }

    /// Idempotent teardown.
    ///
    /// Cancels the session scope (pump, probe, any pending reconnect sleep)
    /// and disconnects the upstream best-effort. Safe to call repeatedly and
    /// safe on a session that never fully established.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();
        self.set_state(SessionState::Closed);
        if let Some(mut control) = self.control.lock().await.take() {
            if let Err(e) = control.disconnect().await {
                warn!(identifier = %self.identifier, error = %e, "upstream disconnect failed during close");
            }
        }
        info!(identifier = %self.identifier, channel = %self.client.id, "relay session closed");
    }

    /// Exactly-once terminal failure: one `error` envelope with the manual
    /// reconnect flag, then the session freezes in `Failed`.
    fn fail_terminal(&self) {
        {
            let mut state = self.state.lock();
            if matches!(*state, SessionState::Failed | SessionState::Closed) {
                return;
            }
            *state = SessionState::Failed;
        }
        error!(identifier = %self.identifier, "reconnection attempts exhausted");
        counter!(RELAY_RECONNECT_EXHAUSTED_TOTAL).increment(1);
        let _ = self.client.send_event(&RelayEvent::Error(ErrorPayload {
            message: RECONNECT_EXHAUSTED_MESSAGE.to_owned(),
            needs_manual_reconnect: Some(true),
        }));
    }
}

/// Fall back to a fixed message when the upstream error has no text.
fn non_empty_message(message: &str) -> String {
    if message.trim().is_empty() {
        CONNECT_FAILED_FALLBACK.to_owned()
    } else {
        message.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livebridge_core::ChannelId;
    use livebridge_upstream::ScriptedConnector;
    use serde_json::json;
    use std::time::Duration;

    fn test_config() -> RelayConfig {
        RelayConfig {
            max_reconnect_attempts: 3,
            reconnect_delay: Duration::from_millis(10),
            probe_interval: Duration::from_secs(30),
            probe_enabled: false,
        }
    }

    fn make_session(
        identifier: &str,
        connector: &ScriptedConnector,
        config: RelayConfig,
    ) -> (Arc<RelaySession>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(64);
        let client = Arc::new(ClientConnection::new(ChannelId::from("chan_t"), tx));
        let session = Arc::new(RelaySession::new(
            identifier.to_owned(),
            client,
            Arc::new(connector.clone()),
            config,
        ));
        (session, rx)
    }

    async fn recv_envelope(rx: &mut mpsc::Receiver<String>) -> serde_json::Value {
        let raw = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for envelope")
            .expect("channel closed");
        serde_json::from_str(&raw).unwrap()
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(60)).await;
    }

    #[tokio::test]
    async fn open_success_emits_connected() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let (session, mut rx) = make_session("alice", &connector, test_config());

        session.clone().open().await;

        let env = recv_envelope(&mut rx).await;
        assert_eq!(env["type"], "connected");
        assert_eq!(env["data"]["success"], true);
        assert_eq!(env["data"]["identifier"], "alice");
        assert_eq!(env["data"]["sessionToken"], "123");
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.reconnect_attempts(), 0);
    }

    #[tokio::test]
    async fn open_rejection_emits_failure_without_retry() {
        let connector = ScriptedConnector::new();
        let (session, mut rx) = make_session("nobody", &connector, test_config());

        session.clone().open().await;

        let env = recv_envelope(&mut rx).await;
        assert_eq!(env["type"], "connected");
        assert_eq!(env["data"]["success"], false);
        assert!(env["data"]["error"]
            .as_str()
            .unwrap()
            .contains("nobody"));
        assert_eq!(session.state(), SessionState::Failed);
        // Rejection is not connectivity: exactly the one dial.
        settle().await;
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn valid_chat_is_relayed() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let (session, mut rx) = make_session("alice", &connector, test_config());
        session.clone().open().await;
        let _ = recv_envelope(&mut rx).await; // connected

        assert!(
            connector
                .emit(
                    "alice",
                    UpstreamEvent::Chat(json!({"uniqueId": "bob", "comment": "hi"}))
                )
                .await
        );
        let env = recv_envelope(&mut rx).await;
        assert_eq!(env["type"], "chat");
        assert_eq!(env["data"]["username"], "bob");
        assert_eq!(env["data"]["nickname"], "bob");
        assert_eq!(env["data"]["message"], "hi");
    }

    #[tokio::test]
    async fn malformed_payloads_emit_nothing() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let (session, mut rx) = make_session("alice", &connector, test_config());
        session.clone().open().await;
        let _ = recv_envelope(&mut rx).await; // connected

        let _ = connector
            .emit("alice", UpstreamEvent::Chat(json!({"comment": "no user"})))
            .await;
        let _ = connector
            .emit("alice", UpstreamEvent::Gift(json!({"uniqueId": 42})))
            .await;
        let _ = connector
            .emit("alice", UpstreamEvent::Like(json!("not an object")))
            .await;
        // A valid event afterwards proves the pump survived the garbage.
        let _ = connector
            .emit(
                "alice",
                UpstreamEvent::Chat(json!({"uniqueId": "eve", "comment": "still here"})),
            )
            .await;

        let env = recv_envelope(&mut rx).await;
        assert_eq!(env["type"], "chat");
        assert_eq!(env["data"]["username"], "eve");
    }

    #[tokio::test]
    async fn benign_errors_are_fully_suppressed() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let (session, mut rx) = make_session("alice", &connector, test_config());
        session.clone().open().await;
        let _ = recv_envelope(&mut rx).await; // connected

        let _ = connector
            .emit(
                "alice",
                UpstreamEvent::Error {
                    message: "unexpected data structure in WebcastGiftMessage".into(),
                },
            )
            .await;
        settle().await;

        assert!(rx.try_recv().is_err(), "benign error must not reach client");
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn other_errors_surface_as_nonfatal_envelope() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let (session, mut rx) = make_session("alice", &connector, test_config());
        session.clone().open().await;
        let _ = recv_envelope(&mut rx).await; // connected

        let _ = connector
            .emit(
                "alice",
                UpstreamEvent::Error {
                    message: "something odd happened".into(),
                },
            )
            .await;

        let env = recv_envelope(&mut rx).await;
        assert_eq!(env["type"], "error");
        assert_eq!(env["data"]["message"], "something odd happened");
        assert!(env["data"].get("needsManualReconnect").is_none());
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn connectivity_error_reconnects_and_resets_counter() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let (session, mut rx) = make_session("alice", &connector, test_config());
        session.clone().open().await;
        let _ = recv_envelope(&mut rx).await; // connected

        let _ = connector
            .emit(
                "alice",
                UpstreamEvent::Error {
                    message: "connection reset by peer".into(),
                },
            )
            .await;

        let env = recv_envelope(&mut rx).await;
        assert_eq!(env["type"], "reconnected");
        assert_eq!(env["data"]["success"], true);
        assert_eq!(env["data"]["attemptNumber"], 1);
        assert_eq!(env["data"]["sessionToken"], "123");
        settle().await;
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.reconnect_attempts(), 0);
        assert_eq!(connector.connect_count(), 2);
    }

    #[tokio::test]
    async fn reconnect_cap_emits_single_terminal_error() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let config = RelayConfig {
            max_reconnect_attempts: 1,
            ..test_config()
        };
        let (session, mut rx) = make_session("alice", &connector, config);
        session.clone().open().await;
        let _ = recv_envelope(&mut rx).await; // connected

        // Every further dial fails, so the single allowed attempt burns out.
        connector.fail_next_connects(u32::MAX);
        let _ = connector
            .emit(
                "alice",
                UpstreamEvent::Error {
                    message: "request timeout".into(),
                },
            )
            .await;

        let env = recv_envelope(&mut rx).await;
        assert_eq!(env["type"], "error");
        assert_eq!(env["data"]["needsManualReconnect"], true);
        settle().await;
        assert_eq!(session.state(), SessionState::Failed);
        // Initial dial + exactly one reconnect attempt.
        assert_eq!(connector.connect_count(), 2);
        assert!(session.reconnect_attempts() <= 1);

        // A second connectivity error after exhaustion changes nothing.
        let _ = connector
            .emit(
                "alice",
                UpstreamEvent::Error {
                    message: "request timeout".into(),
                },
            )
            .await;
        settle().await;
        assert_eq!(connector.connect_count(), 2);
        assert!(rx.try_recv().is_err(), "terminal error must be emitted once");
    }

    #[tokio::test]
    async fn concurrent_connectivity_errors_yield_one_attempt() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let (session, mut rx) = make_session("alice", &connector, test_config());
        session.clone().open().await;
        let _ = recv_envelope(&mut rx).await; // connected

        for _ in 0..5 {
            RelaySession::on_error(&session, "connection reset by peer");
        }
        let env = recv_envelope(&mut rx).await;
        assert_eq!(env["type"], "reconnected");
        assert_eq!(env["data"]["attemptNumber"], 1);
        settle().await;
        // One initial dial + one reconnect, despite five triggers.
        assert_eq!(connector.connect_count(), 2);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let (session, mut rx) = make_session("alice", &connector, test_config());
        session.clone().open().await;
        let _ = recv_envelope(&mut rx).await; // connected

        session.close().await;
        session.close().await;

        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(connector.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn close_before_open_completes_discards_upstream() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let (session, mut rx) = make_session("alice", &connector, test_config());

        session.close().await;
        session.clone().open().await;

        settle().await;
        assert!(rx.try_recv().is_err(), "no envelope after close");
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn close_cancels_inflight_reconnect() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let config = RelayConfig {
            reconnect_delay: Duration::from_millis(50),
            ..test_config()
        };
        let (session, mut rx) = make_session("alice", &connector, config);
        session.clone().open().await;
        let _ = recv_envelope(&mut rx).await; // connected

        RelaySession::on_error(&session, "connection reset by peer");
        // Close while the reconnect task is sitting in its delay.
        session.close().await;
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(session.state(), SessionState::Closed);
        // The pending attempt was cancelled before dialing again.
        assert_eq!(connector.connect_count(), 1);
        assert!(rx.try_recv().is_err(), "no envelope after close");
    }

    #[tokio::test]
    async fn empty_connect_error_falls_back_to_fixed_message() {
        assert_eq!(non_empty_message(""), CONNECT_FAILED_FALLBACK);
        assert_eq!(non_empty_message("   "), CONNECT_FAILED_FALLBACK);
        assert_eq!(non_empty_message("real reason"), "real reason");
    }

    #[tokio::test]
    async fn stream_end_is_relayed() {
        let connector = ScriptedConnector::new();
        connector.add_room("alice", "123");
        let (session, mut rx) = make_session("alice", &connector, test_config());
        session.clone().open().await;
        let _ = recv_envelope(&mut rx).await; // connected

        let _ = connector.emit("alice", UpstreamEvent::StreamEnd).await;
        let env = recv_envelope(&mut rx).await;
        assert_eq!(env["type"], "stream_ended");
        assert!(env.get("data").is_none());
    }
}
