// Public API
pub use driver::BotDriver;

// Internal modules
mod driver;
pub mod strategy;
