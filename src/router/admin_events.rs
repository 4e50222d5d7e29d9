use tracing::{debug, warn};

use super::{close_room, depart_from_room, EventRouter};
use crate::websockets::messages::{AdminDeleteRoomPayload, AdminKickPayload, AdminLoginPayload};
use crate::websockets::WebSocketMessage;

impl EventRouter {
    pub(crate) async fn handle_admin_login(&self, connection_id: &str, payload: serde_json::Value) {
        let state = &self.state;
        let Some(payload) = self
            .parse_payload::<AdminLoginPayload>(connection_id, payload)
            .await
        else {
            return;
        };

        if payload.password == state.config.admin_password {
            state.registry.grant_admin(connection_id).await;
            state
                .broadcaster
                .send(connection_id, &WebSocketMessage::admin_granted())
                .await;
        } else {
            warn!(connection_id = %connection_id, "Failed admin login attempt");
            state
                .broadcaster
                .send_error(connection_id, "wrong password".to_string())
                .await;
        }
    }

    pub(crate) async fn handle_admin_kick(&self, connection_id: &str, payload: serde_json::Value) {
        let state = &self.state;
        if !state.registry.is_admin(connection_id).await {
            debug!(connection_id = %connection_id, "Kick refused: not an admin");
            return;
        }
        let Some(payload) = self
            .parse_payload::<AdminKickPayload>(connection_id, payload)
            .await
        else {
            return;
        };

        // Tell the client to drop, then run its departure server-side so its
        // room is not left waiting on it.
        state
            .broadcaster
            .force_disconnect(&payload.target_id, "Kicked by an admin.".to_string())
            .await;
        let former = state.registry.forget_connection(&payload.target_id).await;
        depart_from_room(state, &payload.target_id, former).await;
    }

    pub(crate) async fn handle_admin_delete_room(
        &self,
        connection_id: &str,
        payload: serde_json::Value,
    ) {
        let state = &self.state;
        if !state.registry.is_admin(connection_id).await {
            debug!(connection_id = %connection_id, "Delete refused: not an admin");
            return;
        }
        let Some(payload) = self
            .parse_payload::<AdminDeleteRoomPayload>(connection_id, payload)
            .await
        else {
            return;
        };

        let room_id = payload.room_id.trim().to_uppercase();
        if state.registry.room(&room_id).await.is_none() {
            state
                .broadcaster
                .send_error(connection_id, "Room not found.".to_string())
                .await;
            return;
        }
        close_room(state, &room_id, "Room closed by an admin.").await;
    }
}
