use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{info, instrument};

use crate::router::close_room;
use crate::shared::AppState;

/// Settings for the background task that closes abandoned rooms.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// How often to look for idle rooms
    pub sweep_interval: Duration,
    /// How long a room must sit without any action before it is closed
    pub idle_after: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(5 * 60),
            idle_after: Duration::from_secs(60 * 60),
        }
    }
}

/// Periodically closes rooms nobody has touched in a while.
#[instrument(skip(state))]
pub async fn start_room_sweeper(state: Arc<AppState>, config: SweeperConfig) {
    info!(
        sweep_interval_secs = config.sweep_interval.as_secs(),
        idle_after_secs = config.idle_after.as_secs(),
        "Starting room sweeper"
    );

    let mut tick = interval(config.sweep_interval);
    loop {
        tick.tick().await;
        let closed = sweep_once(&state, config.idle_after).await;
        if closed > 0 {
            info!(closed = closed, "Idle rooms swept");
        }
    }
}

async fn sweep_once(state: &AppState, idle_after: Duration) -> usize {
    let idle = state.registry.idle_rooms(idle_after).await;
    let count = idle.len();
    for room_id in idle {
        info!(room_id = %room_id, "Closing idle room");
        close_room(state, &room_id, "Room closed after inactivity.").await;
    }
    count
}
