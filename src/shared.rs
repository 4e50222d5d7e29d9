use std::sync::Arc;

use crate::broadcast::Broadcaster;
use crate::config::Config;
use crate::event::EventBus;
use crate::game::dice::{DiceRoller, ThreadRngRoller};
use crate::room::RoomRegistry;
use crate::websockets::{ConnectionManager, InMemoryConnectionManager};

/// Shared application state containing all dependencies
pub struct AppState {
    pub config: Config,
    pub registry: RoomRegistry,
    pub connections: Arc<dyn ConnectionManager>,
    pub event_bus: EventBus,
    pub broadcaster: Broadcaster,
    pub roller: Arc<dyn DiceRoller>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let connections: Arc<dyn ConnectionManager> = Arc::new(InMemoryConnectionManager::new());
        Self {
            config,
            registry: RoomRegistry::new(),
            connections: Arc::clone(&connections),
            event_bus: EventBus::new(),
            broadcaster: Broadcaster::new(connections),
            roller: Arc::new(ThreadRngRoller),
        }
    }

    /// Fresh state with bot pauses disabled, for tests.
    pub fn new_in_memory() -> Self {
        let config = Config {
            bot_delay_ms: 0,
            ..Config::default()
        };
        Self::new(config)
    }

    /// Same as [`AppState::new_in_memory`] but rolling from a caller-supplied source.
    pub fn new_in_memory_with_roller(roller: Arc<dyn DiceRoller>) -> Self {
        let mut state = Self::new_in_memory();
        state.roller = roller;
        state
    }
}
