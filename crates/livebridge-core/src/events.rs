//! Outward event envelopes.
//!
//! `RelayEvent` is the normalized, client-facing event set. Each variant has
//! a fixed payload shape, and every payload field is a concrete primitive —
//! a client never receives a missing or mistyped field. The defaulting that
//! upholds this happens at normalization time, before a `RelayEvent` exists.
//!
//! On the wire an event is an [`Envelope`]: `{"type", "timestamp", "data"}`
//! with camelCase data keys. The envelope timestamp is RFC 3339 UTC; the
//! per-event `timestamp` payload field is a local wall-clock string meant
//! for display only.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder gift name when no payload shape yields one.
pub const UNKNOWN_GIFT_NAME: &str = "Mystery Gift";

/// Fallback message when an upstream connect error carries no text.
pub const CONNECT_FAILED_FALLBACK: &str = "Unable to reach the live stream";

/// Server-pushed event envelope.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    /// Event type (e.g. `chat`, `room_update`).
    #[serde(rename = "type")]
    pub event_type: String,
    /// ISO-8601 emission timestamp.
    pub timestamp: String,
    /// Event payload; absent for payload-free events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// `connected` payload — result of an initial connect attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    /// Whether the upstream connection was established.
    pub success: bool,
    /// Upstream room/session token (empty on failure).
    pub session_token: String,
    /// The target identifier the client asked for.
    pub identifier: String,
    /// Human-readable failure reason (present only on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `reconnected` payload — result of an automatic reconnection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconnectedPayload {
    /// Whether the reconnection succeeded.
    pub success: bool,
    /// Upstream room/session token after reconnecting.
    pub session_token: String,
    /// Which attempt (1-based) produced this result.
    pub attempt_number: u32,
}

/// `chat` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    /// Stable user identifier.
    pub username: String,
    /// Display name (falls back to the username).
    pub nickname: String,
    /// Chat message text.
    pub message: String,
    /// Avatar image URL (empty when the upstream omits it).
    pub avatar_url: String,
    /// Local wall-clock time string (display only).
    pub timestamp: String,
}

/// `gift` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftPayload {
    /// Stable user identifier.
    pub username: String,
    /// Display name (falls back to the username).
    pub nickname: String,
    /// Resolved gift name (see the normalization rules for the lookup order).
    pub gift_name: String,
    /// Upstream gift kind discriminator.
    pub gift_kind: i64,
    /// Gift value in the platform's currency units.
    pub value: i64,
    /// Avatar image URL (empty when the upstream omits it).
    pub avatar_url: String,
    /// Local wall-clock time string (display only).
    pub timestamp: String,
}

/// `like` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikePayload {
    /// Stable user identifier.
    pub username: String,
    /// Display name (falls back to the username).
    pub nickname: String,
    /// Likes in this burst.
    pub like_count: i64,
    /// Running total for the stream.
    pub total_like_count: i64,
    /// Avatar image URL (empty when the upstream omits it).
    pub avatar_url: String,
    /// Local wall-clock time string (display only).
    pub timestamp: String,
}

/// `social` payload — follows, shares, and similar interactions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialPayload {
    /// Stable user identifier.
    pub username: String,
    /// Display name (falls back to the username).
    pub nickname: String,
    /// What the user did, as the upstream reports it.
    pub action: String,
    /// Avatar image URL (empty when the upstream omits it).
    pub avatar_url: String,
    /// Local wall-clock time string (display only).
    pub timestamp: String,
}

/// `room_update` payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdatePayload {
    /// Current viewer count.
    pub viewer_count: i64,
    /// Local wall-clock time string (display only).
    pub timestamp: String,
}

/// `error` payload — non-fatal and terminal relay errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    /// Human-readable error message.
    pub message: String,
    /// Set when automatic reconnection is exhausted and the client must
    /// issue a fresh connect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_manual_reconnect: Option<bool>,
}

/// The normalized outward event set.
#[derive(Clone, Debug, PartialEq)]
pub enum RelayEvent {
    /// Initial connect attempt resolved.
    Connected(ConnectedPayload),
    /// Automatic reconnection resolved.
    Reconnected(ReconnectedPayload),
    /// A chat message.
    Chat(ChatPayload),
    /// A gift.
    Gift(GiftPayload),
    /// A like burst.
    Like(LikePayload),
    /// A follow/share interaction.
    Social(SocialPayload),
    /// Viewer count changed.
    RoomUpdate(RoomUpdatePayload),
    /// The upstream stream ended.
    StreamEnded,
    /// Relay error surfaced to the client.
    Error(ErrorPayload),
}

impl RelayEvent {
    /// Wire name of this event.
    #[must_use]
    pub fn wire_type(&self) -> &'static str {
        match self {
            Self::Connected(_) => "connected",
            Self::Reconnected(_) => "reconnected",
            Self::Chat(_) => "chat",
            Self::Gift(_) => "gift",
            Self::Like(_) => "like",
            Self::Social(_) => "social",
            Self::RoomUpdate(_) => "room_update",
            Self::StreamEnded => "stream_ended",
            Self::Error(_) => "error",
        }
    }

    /// Build the wire envelope for this event, stamped with the current
    /// UTC time.
    #[must_use]
    pub fn to_envelope(&self) -> Envelope {
        let data = match self {
            Self::Connected(p) => Some(serde_json::to_value(p).unwrap_or_default()),
            Self::Reconnected(p) => Some(serde_json::to_value(p).unwrap_or_default()),
            Self::Chat(p) => Some(serde_json::to_value(p).unwrap_or_default()),
            Self::Gift(p) => Some(serde_json::to_value(p).unwrap_or_default()),
            Self::Like(p) => Some(serde_json::to_value(p).unwrap_or_default()),
            Self::Social(p) => Some(serde_json::to_value(p).unwrap_or_default()),
            Self::RoomUpdate(p) => Some(serde_json::to_value(p).unwrap_or_default()),
            Self::StreamEnded => None,
            Self::Error(p) => Some(serde_json::to_value(p).unwrap_or_default()),
        };
        Envelope {
            event_type: self.wire_type().to_owned(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            data,
        }
    }
}

/// Current local wall-clock time as a display string.
///
/// This is the value carried in per-event `timestamp` payload fields. The
/// exact format is not a compatibility contract.
#[must_use]
pub fn local_time_string() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
