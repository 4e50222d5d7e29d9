use tokio::time::{sleep, Duration};

use killer::{Game, GamePhase, MessageHandler, MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Send a WebSocket message and give the spawned followup work a moment.
    pub async fn send_message(&self, connection_id: &str, message: WebSocketMessage) {
        let raw = serde_json::to_string(&message).unwrap();
        self.router.handle_message(connection_id, raw).await;
        sleep(Duration::from_millis(10)).await;
    }

    /// Push raw text through the router, bypassing envelope construction.
    pub async fn send_raw(&self, connection_id: &str, raw: &str) {
        self.router
            .handle_message(connection_id, raw.to_string())
            .await;
        sleep(Duration::from_millis(10)).await;
    }

    /// Append more faces to the dice script.
    pub fn script_dice(&self, faces: Vec<u8>) {
        self.roller.extend(faces);
    }

    /// Current phase, read straight off the room.
    pub async fn game_phase(&self) -> GamePhase {
        let room = self
            .state
            .registry
            .room(&self.room_id)
            .await
            .expect("room exists");
        let game = room.lock().await;
        game.phase()
    }

    /// Poll the room until `predicate` holds, panicking after two seconds.
    /// Bot turns run from background tasks, so tests that involve bots have
    /// to wait rather than assert immediately.
    pub async fn wait_for_game<F>(&self, predicate: F)
    where
        F: Fn(&Game) -> bool,
    {
        let room = self
            .state
            .registry
            .room(&self.room_id)
            .await
            .expect("room exists");
        for _ in 0..200 {
            {
                let game = room.lock().await;
                if predicate(&game) {
                    return;
                }
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("game never reached the expected state");
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn send_start_game(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::StartGame, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_confirm(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::ConfirmHitPoints, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_start_turn(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::StartTurn, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_keep_dice(&self, player: &str, indices: Vec<usize>) {
        self.send_message(
            player,
            WebSocketMessage::new(
                MessageType::KeepDice,
                serde_json::json!({ "indices": indices }),
            ),
        )
        .await;
    }

    pub async fn send_roll_regen(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::RollRegen, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_end_regen(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::EndRegen, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_roll_attack(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::RollAttack, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_keep_attack_dice(&self, player: &str, indices: Vec<usize>) {
        self.send_message(
            player,
            WebSocketMessage::new(
                MessageType::KeepAttackDice,
                serde_json::json!({ "indices": indices }),
            ),
        )
        .await;
    }

    pub async fn send_resolve_attack(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::ResolveAttack, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_next_victim(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::NextVictim, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_replay(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::Replay, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_leave(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::Leave, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_join_lobby(&self, player: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(MessageType::JoinLobby, serde_json::json!({})),
        )
        .await;
    }

    pub async fn send_join_room(&self, player: &str, room_id: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(
                MessageType::JoinRoom,
                serde_json::json!({ "room_id": room_id, "player_name": player }),
            ),
        )
        .await;
    }

    pub async fn send_admin_login(&self, player: &str, password: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(
                MessageType::AdminLogin,
                serde_json::json!({ "password": password }),
            ),
        )
        .await;
    }

    pub async fn send_admin_delete_room(&self, player: &str, room_id: &str) {
        self.send_message(
            player,
            WebSocketMessage::new(
                MessageType::AdminDeleteRoom,
                serde_json::json!({ "room_id": room_id }),
            ),
        )
        .await;
    }
}
