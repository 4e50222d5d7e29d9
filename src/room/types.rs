use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::game::phase::GamePhase;

/// Lobby-facing status of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Open,
    Playing,
    Finished,
}

impl RoomStatus {
    pub fn from_phase(phase: GamePhase) -> Self {
        match phase {
            GamePhase::Waiting => RoomStatus::Open,
            GamePhase::GameOver => RoomStatus::Finished,
            _ => RoomStatus::Playing,
        }
    }
}

/// One row of the lobby room list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub status: RoomStatus,
    pub player_count: usize,
}
