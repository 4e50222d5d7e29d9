use serde::{Deserialize, Serialize};

/// Facts about a room that already happened, published after the state has
/// been broadcast. Subscribers (the bot driver, for one) react to these
/// instead of being called from the handlers directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RoomEvent {
    /// The room's game state changed and a snapshot went out.
    StateChanged { room_id: String },
    /// The room is gone; subscription tasks should wind down.
    RoomClosed { room_id: String, reason: String },
}

impl RoomEvent {
    pub fn room_id(&self) -> &str {
        match self {
            RoomEvent::StateChanged { room_id } => room_id,
            RoomEvent::RoomClosed { room_id, .. } => room_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            RoomEvent::StateChanged { .. } => "state_changed",
            RoomEvent::RoomClosed { .. } => "room_closed",
        }
    }
}
