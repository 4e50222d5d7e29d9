use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::event::RoomEvent;
use crate::game::logic::{Game, GameAction, GameNote};
use crate::shared::AppState;
use crate::websockets::messages::KeepDicePayload;
use crate::websockets::{MessageHandler, MessageType, WebSocketMessage};

mod admin_events;
mod game_events;
mod lobby_events;

pub(crate) use game_events::apply_room_action;

/// Dispatch table between inbound messages and room operations.
///
/// One router is attached to each connection; all of them share the same
/// [`AppState`], so the connection id is the only per-client context.
pub struct EventRouter {
    state: Arc<AppState>,
}

impl EventRouter {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Run the departure flow for a connection whose socket is gone.
    pub async fn disconnect(&self, connection_id: &str) {
        let former_room = self.state.registry.forget_connection(connection_id).await;
        depart_from_room(&self.state, connection_id, former_room).await;
    }

    async fn parse_payload<T: DeserializeOwned>(
        &self,
        connection_id: &str,
        payload: serde_json::Value,
    ) -> Option<T> {
        match serde_json::from_value(payload) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Malformed message payload"
                );
                self.state
                    .broadcaster
                    .send_error(connection_id, "malformed payload".to_string())
                    .await;
                None
            }
        }
    }

    async fn run_keep(&self, connection_id: &str, payload: serde_json::Value, attack: bool) {
        let Some(payload) = self
            .parse_payload::<KeepDicePayload>(connection_id, payload)
            .await
        else {
            return;
        };
        let action = if attack {
            GameAction::KeepAttackDice(payload.indices)
        } else {
            GameAction::KeepDice(payload.indices)
        };
        self.run_action(connection_id, action).await;
    }
}

#[async_trait]
impl MessageHandler for EventRouter {
    async fn handle_message(&self, connection_id: &str, message: String) {
        let ws_message = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                self.state
                    .broadcaster
                    .send_error(connection_id, "unrecognized message".to_string())
                    .await;
                return;
            }
        };

        debug!(
            connection_id = %connection_id,
            message_type = ?ws_message.message_type,
            "Dispatching message"
        );

        match ws_message.message_type {
            MessageType::JoinLobby => self.handle_join_lobby(connection_id).await,
            MessageType::CreateRoom => {
                self.handle_create_room(connection_id, ws_message.payload)
                    .await
            }
            MessageType::JoinRoom => {
                self.handle_join_room(connection_id, ws_message.payload)
                    .await
            }
            MessageType::AddBot => self.handle_add_bot(connection_id).await,
            MessageType::Leave => self.handle_leave(connection_id).await,
            MessageType::StartGame => self.handle_start_game(connection_id).await,
            MessageType::Replay => self.handle_replay(connection_id).await,
            MessageType::CloseRoom => self.handle_close_room(connection_id).await,

            MessageType::ConfirmHitPoints => {
                self.run_action(connection_id, GameAction::ConfirmReady)
                    .await
            }
            MessageType::StartTurn => self.run_action(connection_id, GameAction::StartTurn).await,
            MessageType::KeepDice => self.run_keep(connection_id, ws_message.payload, false).await,
            MessageType::RollRegen => self.run_action(connection_id, GameAction::RollRegen).await,
            MessageType::EndRegen => self.run_action(connection_id, GameAction::EndRegen).await,
            MessageType::RollAttack => self.run_action(connection_id, GameAction::RollAttack).await,
            MessageType::KeepAttackDice => {
                self.run_keep(connection_id, ws_message.payload, true).await
            }
            MessageType::ResolveAttack => {
                self.run_action(connection_id, GameAction::ResolveAttack)
                    .await
            }
            MessageType::NextVictim => self.run_action(connection_id, GameAction::NextVictim).await,

            MessageType::AdminLogin => {
                self.handle_admin_login(connection_id, ws_message.payload)
                    .await
            }
            MessageType::AdminKick => {
                self.handle_admin_kick(connection_id, ws_message.payload)
                    .await
            }
            MessageType::AdminDeleteRoom => {
                self.handle_admin_delete_room(connection_id, ws_message.payload)
                    .await
            }

            // Server-to-client types echoed back by a confused client
            _ => {
                debug!(
                    message_type = ?ws_message.message_type,
                    "Ignoring non-client message type"
                );
            }
        }
    }
}

/// Broadcast a room's snapshot plus any notes, then poke subscribers.
///
/// Callers must already hold the room's game lock; registry map reads are
/// fine under it, but nothing here may take another game's lock.
pub(crate) async fn publish_room(state: &AppState, room_id: &str, game: &Game, notes: &[GameNote]) {
    let members = state.registry.members_of(room_id).await;
    state.broadcaster.broadcast_game(&members, game).await;
    state.broadcaster.broadcast_notes(&members, notes).await;
}

/// Signal room subscribers (the bot driver) that the room state moved.
pub(crate) async fn signal_state_changed(state: &AppState, room_id: &str) {
    state
        .event_bus
        .emit_to_room(
            room_id,
            RoomEvent::StateChanged {
                room_id: room_id.to_string(),
            },
        )
        .await;
}

/// Push the public room list to every lobby watcher.
///
/// Never call this while holding any game lock: building the summaries
/// takes every room's lock in turn.
pub(crate) async fn push_room_list(state: &AppState) {
    let watchers = state.registry.lobby_watchers().await;
    if watchers.is_empty() {
        return;
    }
    let rooms = state.registry.summaries().await;
    state.broadcaster.send_room_list(&watchers, rooms).await;
}

/// Tear a room down: evict members, tell them why, drop the room's event
/// channel and refresh the lobby.
pub async fn close_room(state: &AppState, room_id: &str, reason: &str) {
    let members = state.registry.remove_room(room_id).await;
    for connection_id in &members {
        state
            .broadcaster
            .force_disconnect(connection_id, reason.to_string())
            .await;
    }

    state
        .event_bus
        .emit_to_room(
            room_id,
            RoomEvent::RoomClosed {
                room_id: room_id.to_string(),
                reason: reason.to_string(),
            },
        )
        .await;
    state.event_bus.remove_room_channel(room_id).await;

    info!(room_id = %room_id, reason = %reason, "Room closed");
    push_room_list(state).await;
}

/// Remove a departed player from their room and run the fallout: owner
/// promotion, turn advance, or closing the room when no humans remain.
pub(crate) async fn depart_from_room(
    state: &AppState,
    connection_id: &str,
    former_room: Option<String>,
) {
    let Some(room_id) = former_room else {
        return;
    };
    let Some(game) = state.registry.room(&room_id).await else {
        return;
    };

    use crate::game::logic::LeaveOutcome;

    let mut should_close = false;
    let mut left = false;
    {
        let mut game = game.lock().await;
        match game.remove_player(connection_id) {
            LeaveOutcome::NotMember => {}
            LeaveOutcome::Left {
                notes, close_room, ..
            } => {
                left = true;
                if close_room {
                    should_close = true;
                } else {
                    publish_room(state, &room_id, &game, &notes).await;
                }
            }
        }
    }

    if should_close {
        close_room(state, &room_id, "Room closed.").await;
    } else if left {
        signal_state_changed(state, &room_id).await;
        push_room_list(state).await;
    }
}
