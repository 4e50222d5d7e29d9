use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use super::types::{RoomStatus, RoomSummary};
use crate::game::logic::Game;

const ROOM_CODE_LENGTH: usize = 6;
const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Short code players type to join a room.
fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_CHARSET[rng.random_range(0..ROOM_CODE_CHARSET.len())] as char)
        .collect()
}

/// Process-wide directory of rooms and who is looking at what.
///
/// Each room's [`Game`] sits behind its own mutex, so two rooms never block
/// each other and every action within a room is serialized. The registry's
/// own maps are only held long enough to look things up, never across a
/// game lock.
pub struct RoomRegistry {
    /// room_id -> game, one lock per room
    rooms: RwLock<HashMap<String, Arc<Mutex<Game>>>>,
    /// connection_id -> room_id for every seated human
    memberships: RwLock<HashMap<String, String>>,
    /// Connections on the lobby screen, fed room list updates
    lobby_watchers: RwLock<HashSet<String>>,
    /// Connections that have authenticated as admin
    admins: RwLock<HashSet<String>>,
    /// room_id -> last action timestamp, for the idle sweeper
    activity: RwLock<HashMap<String, Instant>>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            memberships: RwLock::new(HashMap::new()),
            lobby_watchers: RwLock::new(HashSet::new()),
            admins: RwLock::new(HashSet::new()),
            activity: RwLock::new(HashMap::new()),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_room(&self, display_name: &str) -> (String, Arc<Mutex<Game>>) {
        let mut rooms = self.rooms.write().await;
        let mut room_id = generate_room_code();
        while rooms.contains_key(&room_id) {
            room_id = generate_room_code();
        }
        let game = Arc::new(Mutex::new(Game::new(
            room_id.clone(),
            display_name.to_string(),
        )));
        rooms.insert(room_id.clone(), game.clone());
        drop(rooms);

        self.touch(&room_id).await;
        info!(room_id = %room_id, name = %display_name, "Room created");
        (room_id, game)
    }

    pub async fn room(&self, room_id: &str) -> Option<Arc<Mutex<Game>>> {
        self.rooms.read().await.get(room_id).cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Drop a room and every membership pointing at it. Returns the
    /// connection ids that were still seated so the caller can tell them.
    #[instrument(skip(self))]
    pub async fn remove_room(&self, room_id: &str) -> Vec<String> {
        let removed = self.rooms.write().await.remove(room_id).is_some();
        self.activity.write().await.remove(room_id);

        let mut members = Vec::new();
        let mut memberships = self.memberships.write().await;
        memberships.retain(|connection_id, joined_room| {
            if joined_room == room_id {
                members.push(connection_id.clone());
                false
            } else {
                true
            }
        });
        drop(memberships);

        if removed {
            info!(room_id = %room_id, evicted = members.len(), "Room removed");
        }
        members
    }

    /// Snapshot of every room for the lobby list, sorted by name for a
    /// stable display.
    pub async fn summaries(&self) -> Vec<RoomSummary> {
        let rooms: Vec<(String, Arc<Mutex<Game>>)> = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(id, game)| (id.clone(), game.clone()))
            .collect();

        let mut summaries = Vec::with_capacity(rooms.len());
        for (id, game) in rooms {
            let game = game.lock().await;
            summaries.push(RoomSummary {
                id,
                name: game.display_name().to_string(),
                status: RoomStatus::from_phase(game.phase()),
                player_count: game.players().len(),
            });
        }
        summaries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    // --- connection bookkeeping ---

    pub async fn track_membership(&self, connection_id: &str, room_id: &str) {
        self.memberships
            .write()
            .await
            .insert(connection_id.to_string(), room_id.to_string());
    }

    pub async fn membership(&self, connection_id: &str) -> Option<String> {
        self.memberships.read().await.get(connection_id).cloned()
    }

    pub async fn clear_membership(&self, connection_id: &str) -> Option<String> {
        self.memberships.write().await.remove(connection_id)
    }

    pub async fn members_of(&self, room_id: &str) -> Vec<String> {
        self.memberships
            .read()
            .await
            .iter()
            .filter(|(_, joined_room)| joined_room.as_str() == room_id)
            .map(|(connection_id, _)| connection_id.clone())
            .collect()
    }

    pub async fn watch_lobby(&self, connection_id: &str) {
        self.lobby_watchers
            .write()
            .await
            .insert(connection_id.to_string());
    }

    pub async fn unwatch_lobby(&self, connection_id: &str) {
        self.lobby_watchers.write().await.remove(connection_id);
    }

    pub async fn lobby_watchers(&self) -> Vec<String> {
        self.lobby_watchers.read().await.iter().cloned().collect()
    }

    pub async fn grant_admin(&self, connection_id: &str) {
        info!(connection_id = %connection_id, "Admin access granted");
        self.admins.write().await.insert(connection_id.to_string());
    }

    pub async fn is_admin(&self, connection_id: &str) -> bool {
        self.admins.read().await.contains(connection_id)
    }

    /// Forget everything about a connection. Returns the room it was seated
    /// in, if any, so the caller can run the departure.
    pub async fn forget_connection(&self, connection_id: &str) -> Option<String> {
        self.lobby_watchers.write().await.remove(connection_id);
        self.admins.write().await.remove(connection_id);
        let former_room = self.memberships.write().await.remove(connection_id);
        debug!(
            connection_id = %connection_id,
            former_room = ?former_room,
            "Connection forgotten"
        );
        former_room
    }

    // --- idle tracking ---

    pub async fn touch(&self, room_id: &str) {
        self.activity
            .write()
            .await
            .insert(room_id.to_string(), Instant::now());
    }

    pub async fn idle_rooms(&self, idle_after: Duration) -> Vec<String> {
        let now = Instant::now();
        self.activity
            .read()
            .await
            .iter()
            .filter(|(_, last)| now.duration_since(**last) >= idle_after)
            .map(|(room_id, _)| room_id.clone())
            .collect()
    }
}
