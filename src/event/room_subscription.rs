use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::bus::EventBus;
use super::events::RoomEvent;
use super::room_handler::RoomEventHandler;

/// Routes one room's events to a handler from a background task.
pub struct RoomSubscription {
    room_id: String,
    handler: Arc<dyn RoomEventHandler>,
    event_bus: EventBus,
}

impl RoomSubscription {
    pub fn new(room_id: String, handler: Arc<dyn RoomEventHandler>, event_bus: EventBus) -> Self {
        Self {
            room_id,
            handler,
            event_bus,
        }
    }

    /// Spawns the listener task. The task runs until the room closes or the
    /// channel is dropped; missed events are skipped, not fatal.
    pub async fn start(self) -> JoinHandle<()> {
        let room_id = self.room_id.clone();
        let handler_name = self.handler.handler_name();

        info!(
            room_id = %room_id,
            handler = handler_name,
            "Starting room subscription"
        );

        let mut receiver = self.event_bus.subscribe_to_room(&room_id).await;

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let room_closed = matches!(event, RoomEvent::RoomClosed { .. });
                        if let Err(e) = self.handler.handle_room_event(&room_id, event).await {
                            debug!(
                                room_id = %room_id,
                                handler = handler_name,
                                error = %e,
                                "Room event handler failed"
                            );
                        }
                        if room_closed {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            room_id = %room_id,
                            handler = handler_name,
                            skipped = skipped,
                            "Room subscription lagged"
                        );
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!(
                room_id = %room_id,
                handler = handler_name,
                "Room subscription ended"
            );
        })
    }
}
