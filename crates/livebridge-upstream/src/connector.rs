//! The connector trait seam.
//!
//! A [`LiveConnector`] is the only way the relay touches the streaming
//! service. Implementations own the dial, the protocol decode, and the
//! callback plumbing; the relay only ever sees an [`UpstreamSession`].

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::types::{RoomInfo, UpstreamEvent, UpstreamState};

/// Errors surfaced by connector operations.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The service rejected the target (unknown user, stream offline).
    #[error("{message}")]
    Rejected {
        /// Human-readable rejection reason.
        message: String,
    },
    /// Transport-level failure (dial, timeout, reset).
    #[error("{message}")]
    Transport {
        /// Human-readable transport failure.
        message: String,
    },
}

impl UpstreamError {
    /// Rejection with the given reason.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Transport failure with the given reason.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// A live upstream connection handed to the relay.
///
/// The event receiver is the connection's callback stream; when the
/// connector loses the service it drops the sender and the stream ends.
pub struct UpstreamSession {
    /// Room details from the connect handshake.
    pub room: RoomInfo,
    /// The connector's event stream.
    pub events: mpsc::Receiver<UpstreamEvent>,
    /// Control surface for teardown and introspection.
    pub control: Box<dyn UpstreamControl>,
}

impl std::fmt::Debug for UpstreamSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamSession")
            .field("room", &self.room)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// Control surface over a live upstream connection.
#[async_trait]
pub trait UpstreamControl: Send + Sync {
    /// Best-effort connection state.
    ///
    /// Returns `None` when the connector has no introspection — callers
    /// must treat that as "unknown", never as an error.
    fn state(&self) -> Option<UpstreamState>;

    /// Tear down the upstream connection.
    ///
    /// Callers treat failures as log-only; a failed disconnect must not
    /// keep a session from closing.
    async fn disconnect(&mut self) -> Result<(), UpstreamError>;
}

/// Factory for upstream connections.
#[async_trait]
pub trait LiveConnector: Send + Sync {
    /// Connect to the stream identified by `identifier`.
    async fn connect(&self, identifier: &str) -> Result<UpstreamSession, UpstreamError>;
}
