use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::events::RoomEvent;

const ROOM_CHANNEL_CAPACITY: usize = 100;

/// Per-room broadcast channels for distributing room events.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    /// room_id -> sender
    room_channels: Arc<RwLock<HashMap<String, broadcast::Sender<RoomEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            room_channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Emits an event to all subscribers of a specific room.
    pub async fn emit_to_room(&self, room_id: &str, event: RoomEvent) {
        let room_channels = self.room_channels.read().await;
        if let Some(sender) = room_channels.get(room_id) {
            match sender.send(event) {
                Ok(receiver_count) => {
                    debug!(
                        room_id = %room_id,
                        receivers = receiver_count,
                        "Room event emitted"
                    );
                }
                Err(_) => {
                    debug!(room_id = %room_id, "Room event emitted with no receivers");
                }
            }
        } else {
            debug!(room_id = %room_id, "No room channel found - creating one");
            drop(room_channels);

            let mut room_channels = self.room_channels.write().await;
            let sender = room_channels
                .entry(room_id.to_string())
                .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
                .clone();
            if sender.send(event).is_err() {
                debug!(room_id = %room_id, "Room event sent to new channel with no receivers");
            }
        }
    }

    /// Subscribe to events for a specific room.
    pub async fn subscribe_to_room(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        let room_channels = self.room_channels.read().await;
        if let Some(sender) = room_channels.get(room_id) {
            sender.subscribe()
        } else {
            debug!(room_id = %room_id, "Creating new room channel for subscription");
            drop(room_channels);

            let mut room_channels = self.room_channels.write().await;
            room_channels
                .entry(room_id.to_string())
                .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
                .subscribe()
        }
    }

    /// Drop a room's channel once the room is gone. Pending receivers see
    /// the stream close after draining what was already sent.
    pub async fn remove_room_channel(&self, room_id: &str) {
        if self.room_channels.write().await.remove(room_id).is_some() {
            debug!(room_id = %room_id, "Room channel removed");
        }
    }
}
