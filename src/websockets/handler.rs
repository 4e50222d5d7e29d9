use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::router::EventRouter;
use crate::shared::AppState;

use super::socket::Connection;

/// WebSocket endpoint. Every client talks to the server through here;
/// identity is the per-connection id assigned on upgrade.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(
    socket: axum::extract::ws::WebSocket,
    app_state: Arc<AppState>,
) {
    let connection_id = Uuid::new_v4().to_string();
    info!(
        connection_id = %connection_id,
        "WebSocket connection established"
    );

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    // Register connection with the connection manager
    app_state
        .connections
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    let router = Arc::new(EventRouter::new(app_state.clone()));

    // Create and run the connection until disconnect
    let connection = Connection::new(
        connection_id.clone(),
        Box::new(socket),
        outbound_receiver,
        router.clone(),
    );

    match connection.run().await {
        Ok(()) => {
            info!(
                connection_id = %connection_id,
                "WebSocket connection closed cleanly"
            );
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                error = ?e,
                "WebSocket connection error"
            );
        }
    }

    // Cleanup: leave whatever room the connection was in, then drop the channel
    router.disconnect(&connection_id).await;
    app_state
        .connections
        .remove_connection(&connection_id)
        .await;

    info!(
        connection_id = %connection_id,
        "WebSocket connection cleaned up"
    );
}
