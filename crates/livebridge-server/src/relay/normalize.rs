//! Upstream payload normalization.
//!
//! Raw connector payloads are untrusted JSON. Normalization enforces the one
//! hard requirement — a non-empty user identifier on user-originated events
//! — and coalesces every optional field to a safe default so the outward
//! envelope never carries a missing or mistyped value. Payloads that fail
//! the requirement yield `None` and nothing reaches the client.

use livebridge_core::events::{
    local_time_string, ChatPayload, GiftPayload, LikePayload, RelayEvent, RoomUpdatePayload,
    SocialPayload, UNKNOWN_GIFT_NAME,
};
use livebridge_upstream::UpstreamEvent;
use serde_json::Value;

/// Normalize an upstream event into an outward relay event.
///
/// Returns `None` for malformed payloads and for `Error` events, which are
/// routed through classification instead.
#[must_use]
pub fn normalize(event: &UpstreamEvent) -> Option<RelayEvent> {
    match event {
        UpstreamEvent::Chat(v) => normalize_chat(v),
        UpstreamEvent::Gift(v) => normalize_gift(v),
        UpstreamEvent::Like(v) => normalize_like(v),
        UpstreamEvent::Social(v) => normalize_social(v),
        UpstreamEvent::RoomUpdate(v) => Some(normalize_room_update(v)),
        UpstreamEvent::StreamEnd => Some(RelayEvent::StreamEnded),
        UpstreamEvent::Error { .. } => None,
    }
}

fn normalize_chat(v: &Value) -> Option<RelayEvent> {
    let username = user_id(v)?;
    Some(RelayEvent::Chat(ChatPayload {
        nickname: display_name(v, &username),
        message: string_or_empty(v, "comment"),
        avatar_url: avatar_url(v),
        timestamp: local_time_string(),
        username,
    }))
}

fn normalize_gift(v: &Value) -> Option<RelayEvent> {
    let username = user_id(v)?;
    Some(RelayEvent::Gift(GiftPayload {
        nickname: display_name(v, &username),
        gift_name: gift_name(v),
        gift_kind: int_or_zero(v, "giftType"),
        value: int_or_zero(v, "diamondCount"),
        avatar_url: avatar_url(v),
        timestamp: local_time_string(),
        username,
    }))
}

fn normalize_like(v: &Value) -> Option<RelayEvent> {
    let username = user_id(v)?;
    Some(RelayEvent::Like(LikePayload {
        nickname: display_name(v, &username),
        like_count: int_or_zero(v, "likeCount"),
        total_like_count: int_or_zero(v, "totalLikeCount"),
        avatar_url: avatar_url(v),
        timestamp: local_time_string(),
        username,
    }))
}

fn normalize_social(v: &Value) -> Option<RelayEvent> {
    let username = user_id(v)?;
    Some(RelayEvent::Social(SocialPayload {
        nickname: display_name(v, &username),
        action: string_or_empty(v, "displayType"),
        avatar_url: avatar_url(v),
        timestamp: local_time_string(),
        username,
    }))
}

fn normalize_room_update(v: &Value) -> RelayEvent {
    RelayEvent::RoomUpdate(RoomUpdatePayload {
        viewer_count: int_or_zero(v, "viewerCount"),
        timestamp: local_time_string(),
    })
}

/// The one required field: a non-empty string user identifier.
fn user_id(v: &Value) -> Option<String> {
    match v.get("uniqueId") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Display name, falling back to the user identifier.
fn display_name(v: &Value, username: &str) -> String {
    match v.get("nickname") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => username.to_owned(),
    }
}

/// Avatar URL under either of the upstream's historical keys.
fn avatar_url(v: &Value) -> String {
    for key in ["profilePictureUrl", "avatarUrl"] {
        if let Some(Value::String(s)) = v.get(key) {
            return s.clone();
        }
    }
    String::new()
}

fn string_or_empty(v: &Value, key: &str) -> String {
    match v.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn int_or_zero(v: &Value, key: &str) -> i64 {
    v.get(key).and_then(Value::as_i64).unwrap_or(0)
}

/// Gift name resolution, trying the payload shapes the upstream has used
/// over time: the flat field, then the details object, then the generic
/// nested gift object, then the placeholder.
fn gift_name(v: &Value) -> String {
    if let Some(Value::String(s)) = v.get("giftName") {
        if !s.is_empty() {
            return s.clone();
        }
    }
    if let Some(s) = v
        .get("giftDetails")
        .and_then(|d| d.get("giftName"))
        .and_then(Value::as_str)
    {
        if !s.is_empty() {
            return s.to_owned();
        }
    }
    if let Some(s) = v
        .get("gift")
        .and_then(|g| g.get("name"))
        .and_then(Value::as_str)
    {
        if !s.is_empty() {
            return s.to_owned();
        }
    }
    UNKNOWN_GIFT_NAME.to_owned()
}
