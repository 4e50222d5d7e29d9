//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::collections::HashMap;

use killer::websockets::messages::GameStatePayload;
use killer::{GamePhase, MessageType, RoomSummary, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

/// A drained snapshot of every listed player's outbound queue. Draining
/// happens once, at construction, so several assertions can be run against
/// the same batch of messages.
pub struct MessageAssertion {
    players: Vec<String>,
    messages: HashMap<String, Vec<WebSocketMessage>>,
}

impl MessageAssertion {
    /// Drain and assert over every seated player.
    pub fn for_all_players(setup: &TestSetup) -> Self {
        let players: Vec<&str> = setup.players.iter().map(|s| s.as_str()).collect();
        Self::for_players(setup, players)
    }

    /// Drain and assert over specific connections.
    pub fn for_players(setup: &TestSetup, players: Vec<&str>) -> Self {
        let mut messages = HashMap::new();
        for player in &players {
            messages.insert(player.to_string(), setup.drain_messages(player));
        }
        Self {
            players: players.into_iter().map(|s| s.to_string()).collect(),
            messages,
        }
    }

    fn of_type(&self, player: &str, message_type: MessageType) -> Vec<&WebSocketMessage> {
        self.messages[player]
            .iter()
            .filter(|m| m.message_type == message_type)
            .collect()
    }

    /// Assert every player received at least one message of the type, that
    /// the latest payloads agree, and hand that payload back for inspection.
    pub fn received_message_type(&self, expected_type: MessageType) -> MessageContent {
        let mut last_payloads = Vec::new();
        for player in &self.players {
            let matching = self.of_type(player, expected_type);
            assert!(
                !matching.is_empty(),
                "{} should have received a {:?} message",
                player,
                expected_type
            );
            last_payloads.push(matching.last().unwrap().payload.clone());
        }

        for (i, payload) in last_payloads.iter().enumerate().skip(1) {
            assert_eq!(
                payload, &last_payloads[0],
                "{} saw a different {:?} payload than {}",
                self.players[i], expected_type, self.players[0]
            );
        }

        MessageContent {
            payload: last_payloads[0].clone(),
        }
    }

    /// Assert that none of the players received anything.
    pub fn received_no_messages(&self) {
        for player in &self.players {
            assert!(
                self.messages[player].is_empty(),
                "{} should not have received any messages, got {:?}",
                player,
                self.messages[player]
            );
        }
    }

    /// Assert every player got an ERROR whose text contains `text`.
    pub fn received_error_containing(&self, text: &str) {
        for player in &self.players {
            let found = self.of_type(player, MessageType::Error).iter().any(|m| {
                m.payload["message"]
                    .as_str()
                    .is_some_and(|s| s.contains(text))
            });
            assert!(found, "{} should have received an error about {:?}", player, text);
        }
    }

    /// Assert every player got a NOTIFICATION whose text contains `text`.
    pub fn received_notification_containing(&self, text: &str) {
        for player in &self.players {
            let found = self
                .of_type(player, MessageType::Notification)
                .iter()
                .any(|m| m.payload["text"].as_str().is_some_and(|s| s.contains(text)));
            assert!(
                found,
                "{} should have received a notification about {:?}",
                player, text
            );
        }
    }

    /// Assert every player was told to disconnect, with `text` in the reason.
    pub fn received_force_disconnect_containing(&self, text: &str) {
        for player in &self.players {
            let found = self
                .of_type(player, MessageType::ForceDisconnect)
                .iter()
                .any(|m| {
                    m.payload["reason"]
                        .as_str()
                        .is_some_and(|s| s.contains(text))
                });
            assert!(
                found,
                "{} should have been force-disconnected over {:?}",
                player, text
            );
        }
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    payload: serde_json::Value,
}

impl MessageContent {
    fn state(&self) -> GameStatePayload {
        serde_json::from_value(self.payload.clone()).expect("payload is not a game state")
    }

    /// Take the payload as a parsed game snapshot for direct inspection.
    pub fn game_state(self) -> GameStatePayload {
        self.state()
    }

    pub fn with_phase(self, expected: GamePhase) -> Self {
        assert_eq!(self.state().phase, expected);
        self
    }

    pub fn with_current_player(self, name: &str) -> Self {
        assert_eq!(self.state().current_player_name.as_deref(), Some(name));
        self
    }

    pub fn with_victim(self, name: &str) -> Self {
        assert_eq!(self.state().victim_name.as_deref(), Some(name));
        self
    }

    pub fn with_killer_value(self, value: u8) -> Self {
        assert_eq!(self.state().killer_value, Some(value));
        self
    }

    pub fn with_damage(self, damage: u32) -> Self {
        assert_eq!(self.state().accumulated_damage, damage);
        self
    }

    pub fn with_table_dice(self, dice: Vec<u8>) -> Self {
        assert_eq!(self.state().table_dice, dice);
        self
    }

    pub fn with_kept_dice(self, dice: Vec<u8>) -> Self {
        assert_eq!(self.state().kept_dice, dice);
        self
    }

    pub fn with_winner(self, name: &str) -> Self {
        assert_eq!(self.state().winner_name.as_deref(), Some(name));
        self
    }

    pub fn with_message_containing(self, text: &str) -> Self {
        let message = self.state().message;
        assert!(
            message.contains(text),
            "game message {:?} does not mention {:?}",
            message,
            text
        );
        self
    }

    pub fn with_hit_points(self, player_name: &str, hit_points: i32) -> Self {
        let state = self.state();
        let player = state
            .players
            .iter()
            .find(|p| p.name == player_name)
            .unwrap_or_else(|| panic!("no player named {}", player_name));
        assert_eq!(
            player.hit_points, hit_points,
            "{} has the wrong hit points",
            player_name
        );
        self
    }

    pub fn with_player_count(self, count: usize) -> Self {
        assert_eq!(self.state().players.len(), count);
        self
    }

    /// Take the payload as a parsed room list.
    pub fn room_list(self) -> Vec<RoomSummary> {
        serde_json::from_value(self.payload["rooms"].clone()).expect("payload is not a room list")
    }

    pub fn with_listed_rooms(self, count: usize) -> Self {
        let rooms = self.payload["rooms"]
            .as_array()
            .expect("payload has no room list");
        assert_eq!(rooms.len(), count);
        self
    }
}
