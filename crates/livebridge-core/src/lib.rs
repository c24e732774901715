//! # livebridge-core
//!
//! Foundation types for the Livebridge relay.
//!
//! This crate provides the shared vocabulary the server and upstream crates
//! depend on:
//!
//! - **Branded IDs**: `ChannelId` newtype keying one relay session per client channel
//! - **Envelopes**: `RelayEvent` — the normalized outward event set, with the
//!   guarantee that every serialized field is a defined, type-correct primitive
//! - **Errors**: `RelayError` hierarchy via `thiserror`
//! - **Classification**: upstream error-text classifier with its substring
//!   tables kept as configuration data

#![deny(unsafe_code)]

pub mod errors;
pub mod events;
pub mod ids;

pub use errors::classify::{classify_error, UpstreamErrorKind};
pub use errors::RelayError;
pub use events::{Envelope, RelayEvent};
pub use ids::ChannelId;
