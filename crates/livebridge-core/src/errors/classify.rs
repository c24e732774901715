//! Upstream error-text classification.
//!
//! The upstream connector surfaces errors as free-form strings. The relay's
//! behavior depends entirely on which class the text falls into, so the
//! substring tables live here as configuration data — one auditable place,
//! checked in order — rather than as inline conditionals at the call sites.

use serde::{Deserialize, Serialize};

/// Closed classification of upstream error text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamErrorKind {
    /// Known connector parse noise (malformed internal data structures).
    /// Suppressed entirely: no log, no client emission, no state change.
    Benign,
    /// Transport/timeout-class failure; triggers bounded reconnection.
    Connectivity,
    /// The target identifier is invalid or the stream is offline; surfaced
    /// once, never retried.
    Fatal,
    /// Anything else; logged and surfaced as a non-fatal error.
    Other,
}

/// Connector parse-noise phrases that carry no signal for clients.
const BENIGN_PATTERNS: &[&str] = &[
    "unexpected data structure",
    "failed to decode webcast",
    "unknown message type",
    "malformed payload",
    "missing sigi state",
];

/// Transport-level failure phrases that warrant a reconnection attempt.
const CONNECTIVITY_PATTERNS: &[&str] = &[
    "timeout",
    "timed out",
    "connection reset",
    "connection refused",
    "connection closed",
    "socket hang up",
    "websocket",
    "network",
];

/// Target-rejection phrases that make retrying pointless.
const FATAL_PATTERNS: &[&str] = &[
    "user not found",
    "does not exist",
    "not currently live",
    "is offline",
    "live has ended",
];

/// Classify upstream error text into an [`UpstreamErrorKind`].
///
/// Matching is case-insensitive substring containment, benign first so that
/// connector noise can never masquerade as a connectivity problem.
#[must_use]
pub fn classify_error(message: &str) -> UpstreamErrorKind {
    let lower = message.to_lowercase();
    if BENIGN_PATTERNS.iter().any(|p| lower.contains(p)) {
        return UpstreamErrorKind::Benign;
    }
    if CONNECTIVITY_PATTERNS.iter().any(|p| lower.contains(p)) {
        return UpstreamErrorKind::Connectivity;
    }
    if FATAL_PATTERNS.iter().any(|p| lower.contains(p)) {
        return UpstreamErrorKind::Fatal;
    }
    UpstreamErrorKind::Other
}
