use tracing::debug;

use super::{publish_room, push_room_list, signal_state_changed, EventRouter};
use crate::game::logic::{GameAction, GameError};
use crate::room::types::RoomStatus;
use crate::shared::AppState;

impl EventRouter {
    /// Resolve the sender's room and apply one game action.
    pub(crate) async fn run_action(&self, connection_id: &str, action: GameAction) {
        let Some(room_id) = self.state.registry.membership(connection_id).await else {
            debug!(
                connection_id = %connection_id,
                "Game action from a connection not seated in any room"
            );
            return;
        };
        apply_room_action(&self.state, &room_id, connection_id, action).await;
    }
}

/// Apply one action to one room under its lock, broadcasting on success.
///
/// Humans and bots both come through here, so they face the exact same
/// checks inside [`crate::game::logic::Game::apply`]. Selection mistakes go
/// back to the actor; wrong-actor and wrong-phase attempts are dropped
/// without feedback.
pub(crate) async fn apply_room_action(
    state: &AppState,
    room_id: &str,
    actor_id: &str,
    action: GameAction,
) {
    let Some(game) = state.registry.room(room_id).await else {
        debug!(room_id = %room_id, "Game action for unknown room");
        return;
    };

    state.registry.touch(room_id).await;

    let mut applied = false;
    let mut status_changed = false;
    {
        let mut game = game.lock().await;
        let status_before = RoomStatus::from_phase(game.phase());
        match game.apply(actor_id, action, state.roller.as_ref()) {
            Ok(notes) => {
                applied = true;
                status_changed = RoomStatus::from_phase(game.phase()) != status_before;
                publish_room(state, room_id, &game, &notes).await;
            }
            Err(error @ (GameError::InvalidSelection(_) | GameError::NotEnoughPlayers)) => {
                state
                    .broadcaster
                    .send_error(actor_id, error.to_string())
                    .await;
            }
            Err(error) => {
                debug!(
                    room_id = %room_id,
                    actor_id = %actor_id,
                    error = %error,
                    "Game action dropped"
                );
            }
        }
    }

    if applied {
        signal_state_changed(state, room_id).await;
        if status_changed {
            push_room_list(state).await;
        }
    }
}
