//! Scripted in-process connector.
//!
//! Rooms are declared up front; events are pushed by the test (or by the
//! demo feeder) through [`ScriptedConnector::emit`]. Connect failures can
//! be injected to exercise the relay's reconnection paths, and connect /
//! disconnect calls are counted so tests can assert on them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::debug;

use crate::connector::{LiveConnector, UpstreamControl, UpstreamError, UpstreamSession};
use crate::types::{RoomInfo, UpstreamEvent, UpstreamState};

/// Capacity of each scripted event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Cadence of the demo feeder.
const DEMO_FEED_INTERVAL: Duration = Duration::from_millis(800);

struct Inner {
    /// identifier → room token.
    rooms: Mutex<HashMap<String, String>>,
    /// Live event senders keyed by identifier.
    feeds: Mutex<HashMap<String, mpsc::Sender<UpstreamEvent>>>,
    /// How many upcoming connects should fail with a transport error.
    fail_next: AtomicU32,
    connect_count: AtomicU32,
    disconnect_count: AtomicU32,
    /// What `state()` reports; `None` models a connector without
    /// introspection.
    reported_state: Mutex<Option<UpstreamState>>,
    /// Whether connects start the canned demo feeder.
    demo_feed: bool,
}

/// Deterministic connector for tests and the demo profile.
#[derive(Clone)]
pub struct ScriptedConnector {
    inner: Arc<Inner>,
}

impl ScriptedConnector {
    /// Create an empty connector (no rooms, no feeder).
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                rooms: Mutex::new(HashMap::new()),
                feeds: Mutex::new(HashMap::new()),
                fail_next: AtomicU32::new(0),
                connect_count: AtomicU32::new(0),
                disconnect_count: AtomicU32::new(0),
                reported_state: Mutex::new(Some(UpstreamState::Connected)),
                demo_feed: false,
            }),
        }
    }

    /// Connector for the demo profile: one `demo` room with a canned
    /// feeder that emits chat, like, and gift events on a timer.
    #[must_use]
    pub fn demo() -> Self {
        let connector = Self {
            inner: Arc::new(Inner {
                rooms: Mutex::new(HashMap::new()),
                feeds: Mutex::new(HashMap::new()),
                fail_next: AtomicU32::new(0),
                connect_count: AtomicU32::new(0),
                disconnect_count: AtomicU32::new(0),
                reported_state: Mutex::new(Some(UpstreamState::Connected)),
                demo_feed: true,
            }),
        };
        connector.add_room("demo", "demo-room-1");
        connector
    }

    /// Declare a connectable room.
    pub fn add_room(&self, identifier: &str, room_id: &str) {
        let _ = self
            .inner
            .rooms
            .lock()
            .insert(identifier.to_owned(), room_id.to_owned());
    }

    /// Make the next `n` connect calls fail with a transport error.
    pub fn fail_next_connects(&self, n: u32) {
        self.inner.fail_next.store(n, Ordering::SeqCst);
    }

    /// Push an event into the live feed for `identifier`.
    ///
    /// Returns `false` when no live session exists for the identifier or
    /// the session's receiver is gone.
    pub async fn emit(&self, identifier: &str, event: UpstreamEvent) -> bool {
        let tx = self.inner.feeds.lock().get(identifier).cloned();
        match tx {
            Some(tx) => tx.send(event).await.is_ok(),
            None => false,
        }
    }

    /// Total connect calls, including injected failures.
    #[must_use]
    pub fn connect_count(&self) -> u32 {
        self.inner.connect_count.load(Ordering::SeqCst)
    }

    /// Total disconnect calls.
    #[must_use]
    pub fn disconnect_count(&self) -> u32 {
        self.inner.disconnect_count.load(Ordering::SeqCst)
    }

    /// Override what session controls report from `state()`.
    pub fn set_reported_state(&self, state: Option<UpstreamState>) {
        *self.inner.reported_state.lock() = state;
    }

    fn spawn_demo_feeder(&self, identifier: &str, tx: mpsc::Sender<UpstreamEvent>) {
        let identifier = identifier.to_owned();
        drop(tokio::spawn(async move {
            let mut interval = tokio::time::interval(DEMO_FEED_INTERVAL);
            let mut tick: u64 = 0;
            loop {
                let _ = interval.tick().await;
                let event = demo_event(tick);
                if tx.send(event).await.is_err() {
                    debug!(identifier, "demo feed closed");
                    break;
                }
                tick += 1;
            }
        }));
    }
}

impl Default for ScriptedConnector {
    fn default() -> Self {
        Self::new()
    }
}

/// Canned demo event for the given tick.
fn demo_event(tick: u64) -> UpstreamEvent {
    let user = format!("viewer_{}", tick % 7);
    match tick % 5 {
        0 | 1 => UpstreamEvent::Chat(json!({
            "uniqueId": user,
            "nickname": format!("Viewer {}", tick % 7),
            "comment": format!("hello from tick {tick}"),
        })),
        2 => UpstreamEvent::Like(json!({
            "uniqueId": user,
            "likeCount": 3,
            "totalLikeCount": tick * 3,
        })),
        3 => UpstreamEvent::Gift(json!({
            "uniqueId": user,
            "giftName": "Rose",
            "giftType": 1,
            "diamondCount": 1,
        })),
        _ => UpstreamEvent::RoomUpdate(json!({
            "viewerCount": 40 + (tick % 20),
        })),
    }
}

struct ScriptedControl {
    inner: Arc<Inner>,
    identifier: String,
}

#[async_trait]
impl UpstreamControl for ScriptedControl {
    fn state(&self) -> Option<UpstreamState> {
        *self.inner.reported_state.lock()
    }

    async fn disconnect(&mut self) -> Result<(), UpstreamError> {
        let _ = self.inner.disconnect_count.fetch_add(1, Ordering::SeqCst);
        let _ = self.inner.feeds.lock().remove(&self.identifier);
        Ok(())
    }
}

#[async_trait]
impl LiveConnector for ScriptedConnector {
    async fn connect(&self, identifier: &str) -> Result<UpstreamSession, UpstreamError> {
        let _ = self.inner.connect_count.fetch_add(1, Ordering::SeqCst);

        // Injected failures take priority over room lookup so reconnect
        // tests can fail a known-good room.
        if self
            .inner
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(UpstreamError::transport("connection timed out"));
        }

        let room_id = self
            .inner
            .rooms
            .lock()
            .get(identifier)
            .cloned()
            .ok_or_else(|| {
                UpstreamError::rejected(format!("user not found or not currently live: {identifier}"))
            })?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let _ = self
            .inner
            .feeds
            .lock()
            .insert(identifier.to_owned(), tx.clone());

        if self.inner.demo_feed {
            self.spawn_demo_feeder(identifier, tx);
        }

        Ok(UpstreamSession {
            room: RoomInfo { room_id },
            events: rx,
            control: Box::new(ScriptedControl {
                inner: self.inner.clone(),
                identifier: identifier.to_owned(),
            }),
        })
    }
}
