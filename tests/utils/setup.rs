use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use killer::game::dice::ScriptedRoller;
use killer::{AppState, EventRouter, MessageHandler, MessageType, WebSocketMessage};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// A room full of scripted-dice players wired straight into the router, with
/// one captured outbound channel per connection.
pub struct TestSetup {
    pub state: Arc<AppState>,
    pub router: EventRouter,
    pub roller: Arc<ScriptedRoller>,
    pub room_id: String,
    pub players: Vec<String>,
    receivers: Mutex<HashMap<String, mpsc::UnboundedReceiver<String>>>,
}

impl TestSetup {
    /// Register an extra connection that is not seated anywhere yet.
    pub async fn connect(&self, connection_id: &str) {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.state
            .connections
            .add_connection(connection_id.to_string(), sender)
            .await;
        self.receivers
            .lock()
            .unwrap()
            .insert(connection_id.to_string(), receiver);
    }

    /// Everything queued for `connection_id` since the last drain.
    pub fn drain_messages(&self, connection_id: &str) -> Vec<WebSocketMessage> {
        let mut receivers = self.receivers.lock().unwrap();
        let receiver = receivers
            .get_mut(connection_id)
            .unwrap_or_else(|| panic!("unknown connection {}", connection_id));
        let mut messages = Vec::new();
        while let Ok(raw) = receiver.try_recv() {
            messages.push(serde_json::from_str(&raw).expect("outbound message is not valid JSON"));
        }
        messages
    }

    /// Drop everything queued so far on every connection.
    pub fn clear_messages(&self) {
        let mut receivers = self.receivers.lock().unwrap();
        for receiver in receivers.values_mut() {
            while receiver.try_recv().is_ok() {}
        }
    }
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    bots: usize,
    dice: Vec<u8>,
    room_name: String,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            bots: 0,
            dice: vec![],
            room_name: "Test Room".to_string(),
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "carol"])
    }

    pub fn with_bots(mut self, count: usize) -> Self {
        self.bots = count;
        self
    }

    /// Preload the dice script; rolls past the end come up as 1s.
    pub fn with_dice(mut self, faces: Vec<u8>) -> Self {
        self.dice = faces;
        self
    }

    pub async fn build(self) -> TestSetup {
        let roller = Arc::new(ScriptedRoller::new(self.dice));
        let state = Arc::new(AppState::new_in_memory_with_roller(roller.clone()));
        let router = EventRouter::new(state.clone());

        let mut receivers = HashMap::new();
        for player in &self.players {
            let (sender, receiver) = mpsc::unbounded_channel();
            state
                .connections
                .add_connection(player.clone(), sender)
                .await;
            receivers.insert(player.clone(), receiver);
        }

        // The first player opens the room, everyone else joins it.
        let (first, rest) = self.players.split_first().expect("at least one player");
        let create = WebSocketMessage::new(
            MessageType::CreateRoom,
            serde_json::json!({ "name": self.room_name, "player_name": first }),
        );
        router
            .handle_message(first, serde_json::to_string(&create).unwrap())
            .await;
        let room_id = state
            .registry
            .membership(first)
            .await
            .expect("room was not created");
        for player in rest {
            let join = WebSocketMessage::new(
                MessageType::JoinRoom,
                serde_json::json!({ "room_id": room_id, "player_name": player }),
            );
            router
                .handle_message(player, serde_json::to_string(&join).unwrap())
                .await;
        }
        for _ in 0..self.bots {
            let add = WebSocketMessage::new(MessageType::AddBot, serde_json::json!({}));
            router
                .handle_message(first, serde_json::to_string(&add).unwrap())
                .await;
        }

        let setup = TestSetup {
            state,
            router,
            roller,
            room_id,
            players: self.players,
            receivers: Mutex::new(receivers),
        };
        setup.clear_messages();
        setup
    }
}
