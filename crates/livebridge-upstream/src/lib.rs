//! # livebridge-upstream
//!
//! The boundary to the third-party live-streaming connector.
//!
//! Livebridge deliberately owns none of the streaming service's protocol
//! work. A [`LiveConnector`] hands back an [`UpstreamSession`] whose event
//! stream carries [`UpstreamEvent`]s with payloads exactly as the connector
//! produced them — loosely typed and untrusted. Normalization into the
//! outward envelope set happens downstream, in the relay.
//!
//! [`ScriptedConnector`] is the in-process implementation used by tests and
//! the demo profile: rooms are declared up front, events are fed by hand or
//! by a canned feeder, and connect failures can be injected.

#![deny(unsafe_code)]

pub mod connector;
pub mod scripted;
pub mod types;

pub use connector::{LiveConnector, UpstreamControl, UpstreamError, UpstreamSession};
pub use scripted::ScriptedConnector;
pub use types::{RoomInfo, UpstreamEvent, UpstreamState};
