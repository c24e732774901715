//! Inbound client commands.
//!
//! Clients drive the relay with two commands; anything else on the channel
//! is answered with an `error` envelope, never a dropped connection.

use serde::Deserialize;

/// A command sent by the client over its channel.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientCommand {
    /// Open a relay session for the given stream target.
    Connect {
        /// Target stream identifier.
        identifier: String,
    },
    /// Close this channel's relay session.
    Disconnect,
}

/// Parse an inbound text frame as a [`ClientCommand`].
pub fn parse_command(text: &str) -> Result<ClientCommand, serde_json::Error> {
    serde_json::from_str(text)
}
