//! WebSocket channel session — handles a single connected client from
//! upgrade through disconnect.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use livebridge_core::events::{ErrorPayload, RelayEvent};
use livebridge_core::{ChannelId, RelayError};
use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::commands::{parse_command, ClientCommand};
use super::connection::ClientConnection;
use crate::metrics::{WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL};
use crate::relay::session::RelaySession;
use crate::server::AppState;

/// Outbound queue depth per client.
const SEND_QUEUE_CAPACITY: usize = 1024;

/// Run a channel session for a connected client.
///
/// 1. Dispatches inbound text frames as relay commands
/// 2. Forwards outbound envelopes via the send channel
/// 3. Sends periodic Ping frames and drops unresponsive clients
/// 4. Closes the channel's relay session on any exit path — a closed
///    socket is an implicit disconnect
#[instrument(skip_all, fields(channel = %channel_id))]
pub async fn run_ws_session(ws: WebSocket, channel_id: ChannelId, state: AppState) {
    let (mut ws_tx, mut ws_rx) = ws.split();

    let (send_tx, mut send_rx) = mpsc::channel::<String>(SEND_QUEUE_CAPACITY);
    let connection = Arc::new(ClientConnection::new(channel_id.clone(), send_tx));

    let _ = state.connections.fetch_add(1, Ordering::SeqCst);
    info!("client connected");
    counter!(WS_CONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);

    // Outbound forwarder with periodic Ping frames.
    let ping_interval = Duration::from_secs(state.config.heartbeat_interval_secs);
    let pong_timeout = Duration::from_secs(state.config.heartbeat_timeout_secs);
    let outbound_conn = connection.clone();
    let outbound = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(ping_interval);
        // Skip the immediate first tick.
        let _ = ticker.tick().await;

        loop {
            tokio::select! {
                msg = send_rx.recv() => {
                    match msg {
                        Some(text) => {
                            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = ticker.tick() => {
                    if !outbound_conn.check_alive()
                        && outbound_conn.last_pong_elapsed() > pong_timeout
                    {
                        warn!("client unresponsive for {pong_timeout:?}, disconnecting");
                        break;
                    }
                    if ws_tx.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Inbound command loop.
    while let Some(Ok(msg)) = ws_rx.next().await {
        let text = match msg {
            Message::Text(ref t) => Some(t.to_string()),
            Message::Binary(ref data) => match std::str::from_utf8(data) {
                Ok(s) => Some(s.to_string()),
                Err(_) => {
                    debug!(len = data.len(), "ignoring non-UTF8 binary frame");
                    None
                }
            },
            Message::Close(_) => {
                info!("client sent close frame");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {
                connection.mark_alive();
                None
            }
        };

        let Some(text) = text else { continue };
        connection.mark_alive();

        match parse_command(&text) {
            Ok(ClientCommand::Connect { identifier }) => {
                handle_connect(&state, &channel_id, &connection, identifier).await;
            }
            Ok(ClientCommand::Disconnect) => {
                close_session(&state, &channel_id).await;
            }
            Err(e) => {
                debug!(error = %e, "unparseable client command");
                let _ = connection.send_event(&RelayEvent::Error(ErrorPayload {
                    message: format!("invalid command: {e}"),
                    needs_manual_reconnect: None,
                }));
            }
        }
    }

    // Implicit disconnect: the channel is gone, so the session goes too.
    close_session(&state, &channel_id).await;
    outbound.abort();
    let _ = state.connections.fetch_sub(1, Ordering::SeqCst);
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    info!(dropped = connection.drop_count(), "client disconnected");
}

/// Handle a `connect` command: build a session, replace any prior one for
/// this channel, and dial upstream without blocking the command loop.
async fn handle_connect(
    state: &AppState,
    channel_id: &ChannelId,
    connection: &Arc<ClientConnection>,
    identifier: String,
) {
    let identifier = identifier.trim().to_owned();
    if identifier.is_empty() {
        let _ = connection.send_event(&RelayEvent::Error(ErrorPayload {
            message: RelayError::EmptyIdentifier.to_string(),
            needs_manual_reconnect: None,
        }));
        return;
    }

    let session = Arc::new(RelaySession::new(
        identifier,
        connection.clone(),
        state.connector.clone(),
        state.relay_config.clone(),
    ));
    if let Some(prior) = state
        .registry
        .insert(channel_id.clone(), session.clone())
        .await
    {
        debug!(prior = prior.identifier(), "replacing existing session");
        prior.close().await;
    }
    drop(tokio::spawn(async move {
        session.open().await;
    }));
}

/// Close and deregister the channel's relay session, if any.
async fn close_session(state: &AppState, channel_id: &ChannelId) {
    if let Some(session) = state.registry.remove(channel_id).await {
        session.close().await;
    }
}
