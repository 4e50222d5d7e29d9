use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const BOT_ID_PREFIX: &str = "bot-";

/// A seat in a game room. Humans map one-to-one to a websocket connection,
/// bots carry a `bot-` prefixed id and are driven by the bot driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub hit_points: i32,
    pub initial_roll: Vec<u8>,
    pub is_bot: bool,
    pub is_ready: bool,
}

impl Player {
    pub fn human(id: String, name: String) -> Self {
        Self {
            id,
            name,
            hit_points: 0,
            initial_roll: Vec::new(),
            is_bot: false,
            is_ready: false,
        }
    }

    pub fn bot() -> Self {
        let petname = petname::Petnames::default().generate_one(2, "-");
        Self {
            id: format!("{}{}", BOT_ID_PREFIX, Uuid::new_v4()),
            name: format!("{} Bot", petname),
            hit_points: 0,
            initial_roll: Vec::new(),
            is_bot: true,
            is_ready: false,
        }
    }

    /// A player stays in the game at exactly 0 hit points; only a strictly
    /// negative total eliminates them.
    pub fn is_alive(&self) -> bool {
        self.hit_points >= 0
    }
}

pub fn is_bot_id(id: &str) -> bool {
    id.starts_with(BOT_ID_PREFIX)
}
