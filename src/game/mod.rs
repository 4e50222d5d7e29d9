pub mod dice;
pub mod logic;
pub mod phase;
pub mod player;
pub mod scoring;
