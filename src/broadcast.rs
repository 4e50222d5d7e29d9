use std::sync::Arc;
use tracing::error;

use crate::game::logic::{Game, GameNote};
use crate::room::types::RoomSummary;
use crate::websockets::{ConnectionManager, WebSocketMessage};

/// Typed fan-out over the raw connection channels. Serializes each message
/// once, then hands it to the connection manager.
#[derive(Clone)]
pub struct Broadcaster {
    connections: Arc<dyn ConnectionManager>,
}

impl Broadcaster {
    pub fn new(connections: Arc<dyn ConnectionManager>) -> Self {
        Self { connections }
    }

    fn serialize(message: &WebSocketMessage) -> Option<String> {
        match serde_json::to_string(message) {
            Ok(json) => Some(json),
            Err(e) => {
                error!(error = %e, "Failed to serialize outbound message");
                None
            }
        }
    }

    pub async fn send(&self, connection_id: &str, message: &WebSocketMessage) {
        let Some(json) = Self::serialize(message) else {
            return;
        };
        self.connections
            .send_to_connection(connection_id, &json)
            .await;
    }

    pub async fn send_to_many(&self, connection_ids: &[String], message: &WebSocketMessage) {
        let Some(json) = Self::serialize(message) else {
            return;
        };
        self.connections
            .send_to_connections(connection_ids, &json)
            .await;
    }

    pub async fn send_error(&self, connection_id: &str, message: String) {
        self.send(connection_id, &WebSocketMessage::error(message))
            .await;
    }

    /// Full room snapshot to every connected member.
    pub async fn broadcast_game(&self, connection_ids: &[String], game: &Game) {
        self.send_to_many(connection_ids, &WebSocketMessage::game_state(game))
            .await;
    }

    /// One NOTIFICATION per note, in order.
    pub async fn broadcast_notes(&self, connection_ids: &[String], notes: &[GameNote]) {
        for note in notes {
            self.send_to_many(
                connection_ids,
                &WebSocketMessage::notification(note.text.clone(), note.sound),
            )
            .await;
        }
    }

    pub async fn send_room_list(&self, connection_ids: &[String], rooms: Vec<RoomSummary>) {
        self.send_to_many(connection_ids, &WebSocketMessage::room_list(rooms))
            .await;
    }

    pub async fn force_disconnect(&self, connection_id: &str, reason: String) {
        self.send(connection_id, &WebSocketMessage::force_disconnect(reason))
            .await;
    }
}
