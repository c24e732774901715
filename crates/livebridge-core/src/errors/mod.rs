//! Error types for the relay.
//!
//! [`RelayError`] covers the relay's own fallible operations. Upstream error
//! *text* — the free-form messages the connector surfaces — is handled
//! separately by the classifier in [`classify`], because those strings drive
//! behavior (suppress / reconnect / surface) rather than propagation.

pub mod classify;

use thiserror::Error;

/// Top-level error type for relay operations.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The client asked to connect without a target identifier.
    #[error("target identifier must not be empty")]
    EmptyIdentifier,

    /// The upstream connector refused or failed the connection.
    #[error("upstream connect failed: {message}")]
    UpstreamConnect {
        /// Best-effort human-readable reason.
        message: String,
    },

    /// The outward channel to the client is gone.
    #[error("client channel closed")]
    ChannelClosed,

    /// No session is registered for the given channel.
    #[error("no session for channel {channel}")]
    SessionNotFound {
        /// The channel that had no session.
        channel: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            RelayError::EmptyIdentifier.to_string(),
            "target identifier must not be empty"
        );
        assert_eq!(
            RelayError::UpstreamConnect {
                message: "offline".into()
            }
            .to_string(),
            "upstream connect failed: offline"
        );
        assert_eq!(
            RelayError::SessionNotFound {
                channel: "c1".into()
            }
            .to_string(),
            "no session for channel c1"
        );
    }
}
