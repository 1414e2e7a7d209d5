//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! answering commands and forwarding the user's notifications.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use crate::domain::{SwapNotification, UserId};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and answers them.
/// - Forwards notifications involving `user` from the
///   [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut notification_rx: broadcast::Receiver<SwapNotification>,
    user: UserId,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text);
                        if ws_tx.send(Message::text(response)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }
            notification = notification_rx.recv() => {
                match notification {
                    Ok(notification) => {
                        if !notification.involves(user) {
                            continue;
                        }
                        let Some(json) = notification_frame(&notification) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(%user, lagged = n, "ws client lagged behind notification bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!(%user, "ws connection closed");
}

/// Wraps a notification in an `event` envelope.
fn notification_frame(notification: &SwapNotification) -> Option<String> {
    let payload = serde_json::to_value(notification).ok()?;
    let msg = WsMessage::new(
        uuid::Uuid::new_v4().to_string(),
        WsMessageType::Event,
        payload,
    );
    serde_json::to_string(&msg).ok()
}

/// Handles a text message from the client, returning the JSON reply.
fn handle_text_message(text: &str) -> String {
    let reply = match serde_json::from_str::<WsMessage>(text) {
        Err(_) => WsMessage::error(String::new(), 400, "malformed JSON"),
        Ok(msg) => match serde_json::from_value::<WsCommand>(msg.payload) {
            Ok(WsCommand::Ping) => WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({ "pong": true }),
            ),
            Err(_) => WsMessage::error(msg.id, 404, "unknown command"),
        },
    };
    serde_json::to_string(&reply).unwrap_or_default()
}
