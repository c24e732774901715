//! WebSocket channel layer: per-client connection state, inbound command
//! parsing, and the socket session loop.

pub mod commands;
pub mod connection;
pub mod session;
