//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::api::auth::CurrentUser;
use crate::app_state::AppState;

/// `GET /ws`: Upgrade HTTP connection to WebSocket.
///
/// Subscribes to the notification bus before the upgrade completes, so no
/// notification committed after the handshake is missed.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    let notification_rx = state.event_bus.subscribe();
    tracing::debug!(%user, "ws connection opened");
    ws.on_upgrade(move |socket| run_connection(socket, notification_rx, user))
}
