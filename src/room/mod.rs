// Public API
pub use registry::RoomRegistry;
pub use sweeper::{start_room_sweeper, SweeperConfig};
pub use types::{RoomStatus, RoomSummary};

// Internal modules
mod registry;
mod sweeper;
pub mod types;
