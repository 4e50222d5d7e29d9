// Event distribution between the handlers and the background subscribers.

pub use bus::EventBus;
pub use events::RoomEvent;
pub use room_handler::{RoomEventError, RoomEventHandler};
pub use room_subscription::RoomSubscription;

mod bus;
mod events;
pub mod room_handler;
mod room_subscription;
