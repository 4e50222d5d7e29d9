use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::logic::{Game, SoundCue};
use crate::game::phase::GamePhase;
use crate::game::player::Player;
use crate::room::types::RoomSummary;

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // Client -> Server
    JoinLobby,
    CreateRoom,
    JoinRoom,
    AddBot,
    Leave,
    StartGame,
    ConfirmHitPoints,
    StartTurn,
    KeepDice,
    RollRegen,
    EndRegen,
    RollAttack,
    KeepAttackDice,
    ResolveAttack,
    NextVictim,
    Replay,
    CloseRoom,
    AdminLogin,
    AdminKick,
    AdminDeleteRoom,

    // Server -> Client
    GameState,
    Notification,
    RoomList,
    ForceDisconnect,
    Error,
    AdminGranted,
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
    pub player_id: Option<String>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoomPayload {
    /// Optional display name for the room; a generated one is used when absent
    pub name: Option<String>,
    pub player_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomPayload {
    pub room_id: String,
    pub player_name: String,
}

/// Shared by KEEP_DICE and KEEP_ATTACK_DICE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepDicePayload {
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginPayload {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminKickPayload {
    pub target_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDeleteRoomPayload {
    pub room_id: String,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatePayload {
    pub room_id: String,
    pub room_name: String,
    pub phase: GamePhase,
    pub players: Vec<Player>,
    pub owner_id: Option<String>,
    pub current_player_id: Option<String>,
    pub current_player_name: Option<String>,
    pub table_dice: Vec<u8>,
    pub kept_dice: Vec<u8>,
    pub killer_value: Option<u8>,
    pub victim_id: Option<String>,
    pub victim_name: Option<String>,
    pub accumulated_damage: u32,
    pub message: String,
    pub winner_name: Option<String>,
}

impl GameStatePayload {
    /// Full snapshot of a room, enough for a client to render from scratch.
    pub fn from_game(game: &Game) -> Self {
        let killer_value = game.killer_value();
        Self {
            room_id: game.id().to_string(),
            room_name: game.display_name().to_string(),
            phase: game.phase(),
            players: game.players().to_vec(),
            owner_id: game.owner_id().map(str::to_string),
            current_player_id: game.current_player().map(|p| p.id.clone()),
            current_player_name: game.current_player().map(|p| p.name.clone()),
            table_dice: game.table_dice().to_vec(),
            kept_dice: game.kept_dice().to_vec(),
            killer_value: (killer_value != 0).then_some(killer_value),
            victim_id: game.current_victim().map(|p| p.id.clone()),
            victim_name: game.current_victim().map(|p| p.name.clone()),
            accumulated_damage: game.accumulated_damage(),
            message: game.message().to_string(),
            winner_name: game.winner_name().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub text: String,
    pub sound: Option<SoundCue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomListPayload {
    pub rooms: Vec<RoomSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceDisconnectPayload {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminGrantedPayload {
    // Empty payload - just signals that this connection now has admin rights
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
                player_id: None,
            }),
        }
    }

    /// Create a GAME_STATE message
    pub fn game_state(game: &Game) -> Self {
        let payload = GameStatePayload::from_game(game);
        Self::new(
            MessageType::GameState,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a NOTIFICATION message
    pub fn notification(text: String, sound: Option<SoundCue>) -> Self {
        let payload = NotificationPayload { text, sound };
        Self::new(
            MessageType::Notification,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a ROOM_LIST message
    pub fn room_list(rooms: Vec<RoomSummary>) -> Self {
        let payload = RoomListPayload { rooms };
        Self::new(
            MessageType::RoomList,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create a FORCE_DISCONNECT message
    pub fn force_disconnect(reason: String) -> Self {
        let payload = ForceDisconnectPayload { reason };
        Self::new(
            MessageType::ForceDisconnect,
            serde_json::to_value(payload).unwrap(),
        )
    }

    /// Create an ERROR message
    pub fn error(message: String) -> Self {
        let payload = ErrorPayload { message };
        Self::new(MessageType::Error, serde_json::to_value(payload).unwrap())
    }

    /// Create an ADMIN_GRANTED message
    pub fn admin_granted() -> Self {
        let payload = AdminGrantedPayload {};
        Self::new(
            MessageType::AdminGranted,
            serde_json::to_value(payload).unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::types::RoomStatus;

    fn sample_game() -> Game {
        let mut game = Game::new("KQ7PX2".to_string(), "Friday Night".to_string());
        game.join("p1".to_string(), "Alice".to_string()).unwrap();
        game.join("p2".to_string(), "Bob".to_string()).unwrap();
        game
    }

    #[test]
    fn test_message_type_wire_names() {
        let t = serde_json::to_string(&MessageType::ConfirmHitPoints).unwrap();
        assert_eq!(t, "\"CONFIRM_HIT_POINTS\"");
        let t = serde_json::to_string(&MessageType::KeepAttackDice).unwrap();
        assert_eq!(t, "\"KEEP_ATTACK_DICE\"");
        let t = serde_json::to_string(&MessageType::GameState).unwrap();
        assert_eq!(t, "\"GAME_STATE\"");
    }

    #[test]
    fn test_inbound_message_round_trip() {
        let raw = r#"{
            "type": "JOIN_ROOM",
            "payload": {"room_id": "KQ7PX2", "player_name": "Alice"},
            "meta": null
        }"#;
        let message: WebSocketMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(message.message_type, MessageType::JoinRoom);
        let payload: JoinRoomPayload = serde_json::from_value(message.payload).unwrap();
        assert_eq!(payload.room_id, "KQ7PX2");
        assert_eq!(payload.player_name, "Alice");
    }

    #[test]
    fn test_game_state_snapshot_fields() {
        let game = sample_game();
        let payload = GameStatePayload::from_game(&game);
        assert_eq!(payload.room_id, "KQ7PX2");
        assert_eq!(payload.room_name, "Friday Night");
        assert_eq!(payload.phase, GamePhase::Waiting);
        assert_eq!(payload.players.len(), 2);
        assert_eq!(payload.owner_id.as_deref(), Some("p1"));
        assert_eq!(payload.killer_value, None);
        assert_eq!(payload.victim_id, None);
        assert_eq!(payload.winner_name, None);
    }

    #[test]
    fn test_message_constructors_and_serialization() {
        let game = sample_game();

        // game_state
        let gs = WebSocketMessage::game_state(&game);
        assert!(matches!(gs.message_type, MessageType::GameState));
        let s = serde_json::to_string(&gs).unwrap();
        let back: WebSocketMessage = serde_json::from_str(&s).unwrap();
        assert!(matches!(back.message_type, MessageType::GameState));

        // notification
        let n = WebSocketMessage::notification("BOOM!".to_string(), Some(SoundCue::Hit));
        assert!(matches!(n.message_type, MessageType::Notification));
        let s = serde_json::to_string(&n).unwrap();
        assert!(s.contains("\"sound\":\"hit\""));

        // room_list
        let rl = WebSocketMessage::room_list(vec![RoomSummary {
            id: "KQ7PX2".to_string(),
            name: "Friday Night".to_string(),
            status: RoomStatus::Open,
            player_count: 2,
        }]);
        assert!(matches!(rl.message_type, MessageType::RoomList));

        // force_disconnect
        let fd = WebSocketMessage::force_disconnect("kicked by admin".to_string());
        assert!(matches!(fd.message_type, MessageType::ForceDisconnect));

        // error
        let e = WebSocketMessage::error("oops".to_string());
        assert!(matches!(e.message_type, MessageType::Error));

        // admin_granted
        let ag = WebSocketMessage::admin_granted();
        assert!(matches!(ag.message_type, MessageType::AdminGranted));
    }
}
