//! WebSocket upgrade handler and socket loops
//!
//! Each accepted connection gets three tasks: a writer forwarding session
//! events to the socket, a reader parsing inbound frames into commands,
//! and the session task driving polling and command routing. The session
//! stops when the command channel closes, so tearing down the reader is
//! enough to cancel polling.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use cadence_spotify_client::SpotifyClient;

use super::messages::{ClientMessage, ServerMessage};
use super::poller;
use super::session::Session;

/// WebSocket upgrade handler
///
/// No credentials are required at upgrade time; the client authenticates
/// by sending `initiate` with an access token as its first command.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(client): Extension<SpotifyClient>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, client))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, client: SpotifyClient) {
    let connection_id = Uuid::new_v4();
    tracing::info!(connection_id = %connection_id, "WebSocket connection opened");

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Events from the session to the socket
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerMessage>();
    // Commands from the socket to the session
    let (command_tx, command_rx) = mpsc::unbounded_channel::<ClientMessage>();

    let session = Session::new(connection_id, client, event_tx.clone());
    let session_task = tokio::spawn(poller::run(session, command_rx));

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json)).await.is_err() {
                        tracing::debug!(connection_id = %connection_id, "WebSocket send failed");
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                }
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = ws_receiver.next().await {
            match result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(command) => {
                        if command_tx.send(command).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(
                            connection_id = %connection_id,
                            error = %e,
                            "Failed to parse client message"
                        );
                        let _ = event_tx
                            .send(ServerMessage::ConnectError(format!("Invalid message: {e}")));
                    }
                },
                Ok(Message::Binary(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Ignoring binary message");
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                    // Handled by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "WebSocket close received");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    // Whichever side finishes first tears the other down
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    // Dropping the reader closed the command channel; the session task
    // finishes its in-flight cycle (emitting nowhere) and stops.
    let _ = session_task.await;

    tracing::info!(connection_id = %connection_id, "WebSocket connection closed");
}
