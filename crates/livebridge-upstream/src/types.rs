//! Raw upstream event types.
//!
//! Payload-bearing variants carry the connector's JSON verbatim. Field
//! presence and types are not validated here — the relay treats every
//! payload as hostile until normalization proves otherwise.

use serde_json::Value;

/// An event as surfaced by the upstream connector.
#[derive(Clone, Debug)]
pub enum UpstreamEvent {
    /// A chat message payload.
    Chat(Value),
    /// A gift payload.
    Gift(Value),
    /// A like-burst payload.
    Like(Value),
    /// A follow/share payload.
    Social(Value),
    /// A viewer-count payload.
    RoomUpdate(Value),
    /// The stream ended.
    StreamEnd,
    /// The connector reported an error.
    Error {
        /// Free-form error text as the connector produced it.
        message: String,
    },
}

impl UpstreamEvent {
    /// Short label for logging and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::Gift(_) => "gift",
            Self::Like(_) => "like",
            Self::Social(_) => "social",
            Self::RoomUpdate(_) => "room_update",
            Self::StreamEnd => "stream_end",
            Self::Error { .. } => "error",
        }
    }
}

/// Room details returned by a successful connect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoomInfo {
    /// The upstream room/session token.
    pub room_id: String,
}

/// Connection state as reported by the connector's introspection, when it
/// has any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpstreamState {
    /// The upstream connection is healthy.
    Connected,
    /// The connection is up but misbehaving (lag, partial data).
    Degraded,
    /// The connector believes the connection is gone.
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels() {
        assert_eq!(UpstreamEvent::Chat(json!({})).label(), "chat");
        assert_eq!(UpstreamEvent::StreamEnd.label(), "stream_end");
        assert_eq!(
            UpstreamEvent::Error {
                message: "x".into()
            }
            .label(),
            "error"
        );
    }

    #[test]
    fn payload_is_carried_verbatim() {
        let ev = UpstreamEvent::Gift(json!({"giftName": 42, "junk": null}));
        if let UpstreamEvent::Gift(v) = ev {
            assert_eq!(v["giftName"], 42);
            assert!(v["junk"].is_null());
        } else {
            unreachable!();
        }
    }
}
