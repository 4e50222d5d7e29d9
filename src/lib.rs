// Library crate for the Killer dice game server
// This file exposes the public API for integration tests

pub mod bot;
pub mod broadcast;
pub mod config;
pub mod event;
pub mod game;
pub mod room;
pub mod router;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use broadcast::Broadcaster;
pub use config::Config;
pub use event::{EventBus, RoomEvent, RoomSubscription};
pub use game::logic::{Game, GameAction, GameError, GameNote};
pub use game::phase::GamePhase;
pub use room::{RoomRegistry, RoomStatus, RoomSummary};
pub use router::EventRouter;
pub use shared::AppState;
pub use websockets::{ConnectionManager, MessageHandler, MessageType, WebSocketMessage};
