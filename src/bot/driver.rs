use async_trait::async_trait;
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info};

use crate::event::{RoomEvent, RoomEventError, RoomEventHandler};
use crate::game::phase::GamePhase;
use crate::router::apply_room_action;
use crate::shared::AppState;

use super::strategy;

/// Bots pause a random slice of this range before confirming their
/// starting roll, so a table of bots trickles in instead of snapping ready.
const CONFIRM_DELAY_MS: RangeInclusive<u64> = 1000..=3000;

/// Plays every bot seat in one room by reacting to its state changes.
///
/// Each wake-up re-reads the room and recomputes the action from scratch,
/// so a bot that was kicked, or whose moment already passed, finds nothing
/// to do and goes back to sleep.
pub struct BotDriver {
    state: Arc<AppState>,
}

impl BotDriver {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// The bots that owe the room an action right now, and the phase they
    /// owe it in.
    async fn pending_bots(&self, room_id: &str) -> Vec<(String, GamePhase)> {
        let Some(game) = self.state.registry.room(room_id).await else {
            return Vec::new();
        };
        let game = game.lock().await;
        match game.phase() {
            GamePhase::Waiting | GamePhase::GameOver => Vec::new(),
            GamePhase::StartingRolls => game
                .players()
                .iter()
                .filter(|p| p.is_bot && !p.is_ready)
                .map(|p| (p.id.clone(), GamePhase::StartingRolls))
                .collect(),
            phase => game
                .current_player()
                .filter(|p| p.is_bot)
                .map(|p| vec![(p.id.clone(), phase)])
                .unwrap_or_default(),
        }
    }

    /// Fire one delayed bot action. `expected_phase` pins the moment the
    /// action was scheduled for; if the room has moved on by the time the
    /// task wakes, it does nothing.
    fn spawn_bot_action(&self, room_id: String, bot_id: String, expected_phase: GamePhase) {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let delay_ms = if state.config.bot_delay_ms == 0 {
                0
            } else if expected_phase == GamePhase::StartingRolls {
                rand::rng().random_range(CONFIRM_DELAY_MS)
            } else {
                state.config.bot_delay_ms
            };
            if delay_ms > 0 {
                sleep(Duration::from_millis(delay_ms)).await;
            }

            let Some(game) = state.registry.room(&room_id).await else {
                return;
            };
            let action = {
                let game = game.lock().await;
                if game.phase() != expected_phase {
                    debug!(
                        room_id = %room_id,
                        bot_id = %bot_id,
                        expected = %expected_phase,
                        actual = %game.phase(),
                        "Room moved on while the bot was thinking"
                    );
                    return;
                }
                strategy::next_action(&game, &bot_id)
            };
            let Some(action) = action else {
                debug!(room_id = %room_id, bot_id = %bot_id, "Bot woke to nothing to do");
                return;
            };

            info!(
                room_id = %room_id,
                bot_id = %bot_id,
                action = ?action,
                "Bot acting"
            );
            apply_room_action(&state, &room_id, &bot_id, action).await;
        });
    }
}

#[async_trait]
impl RoomEventHandler for BotDriver {
    async fn handle_room_event(
        &self,
        room_id: &str,
        event: RoomEvent,
    ) -> Result<(), RoomEventError> {
        if !matches!(event, RoomEvent::StateChanged { .. }) {
            return Ok(());
        }
        for (bot_id, expected_phase) in self.pending_bots(room_id).await {
            self.spawn_bot_action(room_id.to_string(), bot_id, expected_phase);
        }
        Ok(())
    }

    fn handler_name(&self) -> &'static str {
        "BotDriver"
    }
}
