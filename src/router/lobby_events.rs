use std::sync::Arc;

use tracing::{debug, warn};

use super::{
    close_room, depart_from_room, publish_room, push_room_list, signal_state_changed, EventRouter,
};
use crate::bot::BotDriver;
use crate::event::RoomSubscription;
use crate::game::logic::GameError;
use crate::websockets::messages::{CreateRoomPayload, JoinRoomPayload};

impl EventRouter {
    pub(crate) async fn handle_join_lobby(&self, connection_id: &str) {
        let state = &self.state;
        state.registry.watch_lobby(connection_id).await;
        let rooms = state.registry.summaries().await;
        state
            .broadcaster
            .send_room_list(&[connection_id.to_string()], rooms)
            .await;
    }

    pub(crate) async fn handle_create_room(&self, connection_id: &str, payload: serde_json::Value) {
        let state = &self.state;
        let Some(payload) = self
            .parse_payload::<CreateRoomPayload>(connection_id, payload)
            .await
        else {
            return;
        };

        let player_name = payload.player_name.trim().to_string();
        if player_name.is_empty() {
            state
                .broadcaster
                .send_error(connection_id, "a player name is required".to_string())
                .await;
            return;
        }
        let display_name = payload
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| petname::Petnames::default().generate_one(2, "-"));

        // A connection can only sit in one room at a time.
        let former = state.registry.clear_membership(connection_id).await;
        depart_from_room(state, connection_id, former).await;

        let (room_id, game) = state.registry.create_room(&display_name).await;
        state.registry.track_membership(connection_id, &room_id).await;
        state.registry.unwatch_lobby(connection_id).await;
        {
            let mut game = game.lock().await;
            match game.join(connection_id.to_string(), player_name) {
                Ok(notes) => publish_room(state, &room_id, &game, &notes).await,
                Err(error) => {
                    warn!(room_id = %room_id, error = %error, "Creator could not be seated")
                }
            }
        }

        // Bot turns for this room run off its event stream until it closes.
        let driver = Arc::new(BotDriver::new(Arc::clone(&self.state)));
        RoomSubscription::new(room_id.clone(), driver, state.event_bus.clone())
            .start()
            .await;

        push_room_list(state).await;
    }

    pub(crate) async fn handle_join_room(&self, connection_id: &str, payload: serde_json::Value) {
        let state = &self.state;
        let Some(payload) = self
            .parse_payload::<JoinRoomPayload>(connection_id, payload)
            .await
        else {
            return;
        };

        let player_name = payload.player_name.trim().to_string();
        if player_name.is_empty() {
            state
                .broadcaster
                .send_error(connection_id, "a player name is required".to_string())
                .await;
            return;
        }

        let former = state.registry.clear_membership(connection_id).await;
        depart_from_room(state, connection_id, former).await;

        // Room codes are stored uppercase; accept whatever case was typed.
        let room_id = payload.room_id.trim().to_uppercase();
        let Some(game) = state.registry.room(&room_id).await else {
            state
                .broadcaster
                .send_error(connection_id, "Room not found.".to_string())
                .await;
            return;
        };
        state.registry.touch(&room_id).await;

        let mut joined = false;
        {
            let mut game = game.lock().await;
            match game.join(connection_id.to_string(), player_name) {
                Ok(notes) => {
                    joined = true;
                    state.registry.track_membership(connection_id, &room_id).await;
                    state.registry.unwatch_lobby(connection_id).await;
                    publish_room(state, &room_id, &game, &notes).await;
                }
                Err(error) => {
                    debug!(
                        room_id = %room_id,
                        connection_id = %connection_id,
                        error = %error,
                        "Join rejected"
                    );
                }
            }
        }
        if joined {
            push_room_list(state).await;
        }
    }

    pub(crate) async fn handle_add_bot(&self, connection_id: &str) {
        let state = &self.state;
        let Some(room_id) = state.registry.membership(connection_id).await else {
            return;
        };
        let Some(game) = state.registry.room(&room_id).await else {
            return;
        };
        state.registry.touch(&room_id).await;

        let mut added = false;
        {
            let mut game = game.lock().await;
            match game.add_bot(connection_id) {
                Ok(notes) => {
                    added = true;
                    publish_room(state, &room_id, &game, &notes).await;
                }
                Err(error) => {
                    debug!(
                        room_id = %room_id,
                        connection_id = %connection_id,
                        error = %error,
                        "Add bot rejected"
                    );
                }
            }
        }
        if added {
            push_room_list(state).await;
        }
    }

    pub(crate) async fn handle_leave(&self, connection_id: &str) {
        let state = &self.state;
        let former = state.registry.clear_membership(connection_id).await;
        depart_from_room(state, connection_id, former).await;

        // Back to the lobby with a fresh list.
        state.registry.watch_lobby(connection_id).await;
        let rooms = state.registry.summaries().await;
        state
            .broadcaster
            .send_room_list(&[connection_id.to_string()], rooms)
            .await;
    }

    pub(crate) async fn handle_start_game(&self, connection_id: &str) {
        let state = &self.state;
        let Some(room_id) = state.registry.membership(connection_id).await else {
            return;
        };
        let Some(game) = state.registry.room(&room_id).await else {
            return;
        };
        state.registry.touch(&room_id).await;

        let mut started = false;
        {
            let mut game = game.lock().await;
            match game.start(connection_id, state.roller.as_ref()) {
                Ok(notes) => {
                    started = true;
                    publish_room(state, &room_id, &game, &notes).await;
                }
                Err(error @ GameError::NotEnoughPlayers) => {
                    state
                        .broadcaster
                        .send_error(connection_id, error.to_string())
                        .await;
                }
                Err(error) => {
                    debug!(
                        room_id = %room_id,
                        connection_id = %connection_id,
                        error = %error,
                        "Start rejected"
                    );
                }
            }
        }
        if started {
            signal_state_changed(state, &room_id).await;
            push_room_list(state).await;
        }
    }

    pub(crate) async fn handle_replay(&self, connection_id: &str) {
        let state = &self.state;
        let Some(room_id) = state.registry.membership(connection_id).await else {
            return;
        };
        let Some(game) = state.registry.room(&room_id).await else {
            return;
        };
        state.registry.touch(&room_id).await;

        let mut restarted = false;
        {
            let mut game = game.lock().await;
            match game.replay(connection_id, state.roller.as_ref()) {
                Ok(notes) => {
                    restarted = true;
                    publish_room(state, &room_id, &game, &notes).await;
                }
                Err(error @ GameError::NotEnoughPlayers) => {
                    state
                        .broadcaster
                        .send_error(connection_id, error.to_string())
                        .await;
                }
                Err(error) => {
                    debug!(
                        room_id = %room_id,
                        connection_id = %connection_id,
                        error = %error,
                        "Replay rejected"
                    );
                }
            }
        }
        if restarted {
            signal_state_changed(state, &room_id).await;
            push_room_list(state).await;
        }
    }

    pub(crate) async fn handle_close_room(&self, connection_id: &str) {
        let state = &self.state;
        let Some(room_id) = state.registry.membership(connection_id).await else {
            return;
        };
        let Some(game) = state.registry.room(&room_id).await else {
            return;
        };

        let is_owner = {
            let game = game.lock().await;
            game.owner_id() == Some(connection_id)
        };
        if !is_owner && !state.registry.is_admin(connection_id).await {
            debug!(
                connection_id = %connection_id,
                room_id = %room_id,
                "Close refused: not the owner"
            );
            return;
        }

        close_room(state, &room_id, "The owner closed the room.").await;
    }
}
