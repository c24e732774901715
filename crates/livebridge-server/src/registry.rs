//! Session registry: one relay session per client channel.

use std::collections::HashMap;
use std::sync::Arc;

use livebridge_core::ChannelId;
use metrics::gauge;
use tokio::sync::RwLock;

use crate::metrics::RELAY_SESSIONS_ACTIVE;
use crate::relay::session::RelaySession;

/// Keyed map of live relay sessions, owned by the server state.
///
/// The insert path enforces the one-session-per-channel rule: a new session
/// for an occupied channel replaces the old one, and the caller is handed
/// the displaced session to close. Sessions never stack.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ChannelId, Arc<RelaySession>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a session, returning the displaced one if the channel was
    /// already occupied.
    pub async fn insert(
        &self,
        channel: ChannelId,
        session: Arc<RelaySession>,
    ) -> Option<Arc<RelaySession>> {
        let mut sessions = self.sessions.write().await;
        let prior = sessions.insert(channel, session);
        gauge!(RELAY_SESSIONS_ACTIVE).set(sessions.len() as f64);
        prior
    }

    /// Remove and return the session for a channel.
    pub async fn remove(&self, channel: &ChannelId) -> Option<Arc<RelaySession>> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(channel);
        gauge!(RELAY_SESSIONS_ACTIVE).set(sessions.len() as f64);
        removed
    }

    /// Look up the session for a channel.
    pub async fn get(&self, channel: &ChannelId) -> Option<Arc<RelaySession>> {
        self.sessions.read().await.get(channel).cloned()
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
