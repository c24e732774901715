//! Per-client channel state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use livebridge_core::{ChannelId, RelayEvent};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

/// A connected client channel.
///
/// Outbound envelopes go through a bounded send channel drained by the
/// socket's write task; a full or closed channel drops the envelope and
/// bumps the counter rather than blocking a relay task.
pub struct ClientConnection {
    /// Channel identifier (also the relay session key).
    pub id: ChannelId,
    /// Send side of the socket write task's queue.
    tx: mpsc::Sender<String>,
    /// When this channel was established.
    pub connected_at: Instant,
    /// Whether the client has responded since the last ping.
    pub is_alive: AtomicBool,
    /// When the last Pong (or any activity) was received.
    last_pong: Mutex<Instant>,
    /// Envelopes dropped due to a full or closed channel.
    pub dropped_messages: AtomicU64,
}

impl ClientConnection {
    /// Create a new channel.
    pub fn new(id: ChannelId, tx: mpsc::Sender<String>) -> Self {
        let now = Instant::now();
        Self {
            id,
            tx,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_pong: Mutex::new(now),
            dropped_messages: AtomicU64::new(0),
        }
    }

    /// Send raw text to the client.
    ///
    /// Returns `false` if the channel is full or closed, and increments
    /// the dropped counter.
    pub fn send(&self, message: String) -> bool {
        if self.tx.try_send(message).is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Serialize a relay event into its envelope and send it.
    pub fn send_event(&self, event: &RelayEvent) -> bool {
        match serde_json::to_string(&event.to_envelope()) {
            Ok(json) => self.send(json),
            Err(e) => {
                debug!(channel = %self.id, error = %e, "failed to serialize envelope");
                false
            }
        }
    }

    /// Envelopes dropped so far.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Mark the channel alive (pong or any client activity).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Duration since the last sign of life.
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// Check and reset the alive flag for the ping loop.
    ///
    /// Returns `true` if the client showed life since the last check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Channel age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
