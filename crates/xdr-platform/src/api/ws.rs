//! Real-time WebSocket endpoint
//!
//! Each accepted socket is registered with the [`ConnectionRegistry`] and
//! receives every broadcast until it disconnects. Any text frame from the
//! client is answered with a pong.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::realtime::{Connection, ConnectionRegistry, Notification, WsConnection};

#[derive(Clone)]
pub struct WsState {
    pub registry: ConnectionRegistry,
}

pub fn ws_router(state: WsState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.registry))
}

async fn handle_socket(socket: WebSocket, registry: ConnectionRegistry) {
    let (sink, mut receiver) = socket.split();
    let connection = Arc::new(WsConnection::new(sink));
    let conn_id = connection.id();

    registry.register(connection.clone());
    info!(conn_id = %conn_id, total = registry.len(), "WebSocket client connected");

    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Text(_)) => {
                if let Err(e) = connection.send(&Notification::pong()).await {
                    debug!(conn_id = %conn_id, error = %e, "Pong failed");
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            // Ping/pong frames are answered by axum; binary frames are ignored
            Ok(_) => {}
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    registry.unregister(conn_id);
    info!(conn_id = %conn_id, total = registry.len(), "WebSocket client disconnected");
}
