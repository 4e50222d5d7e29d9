use std::collections::VecDeque;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of die faces. The server is the only source of randomness in the
/// game, so everything that rolls goes through this trait; swapping in a
/// scripted implementation makes every transition deterministic under test.
pub trait DiceRoller: Send + Sync {
    /// Roll a single die, returning a face from 1 to 6.
    fn roll(&self) -> u8;

    /// Roll `count` dice.
    fn roll_hand(&self, count: usize) -> Vec<u8> {
        (0..count).map(|_| self.roll()).collect()
    }
}

/// Production roller backed by the thread-local RNG.
#[derive(Debug, Default)]
pub struct ThreadRngRoller;

impl ThreadRngRoller {
    pub fn new() -> Self {
        Self
    }
}

impl DiceRoller for ThreadRngRoller {
    fn roll(&self) -> u8 {
        rand::rng().random_range(1..=6)
    }
}

/// Roller seeded from a fixed value, for reproducible games.
#[derive(Debug)]
pub struct SeededRoller {
    rng: Mutex<StdRng>,
}

impl SeededRoller {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl DiceRoller for SeededRoller {
    fn roll(&self) -> u8 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.random_range(1..=6)
    }
}

/// Roller that replays a fixed sequence of faces, then falls back to 1s.
/// Used by tests that need exact dice on the table.
#[derive(Debug, Default)]
pub struct ScriptedRoller {
    faces: Mutex<VecDeque<u8>>,
}

impl ScriptedRoller {
    pub fn new<I: IntoIterator<Item = u8>>(faces: I) -> Self {
        Self {
            faces: Mutex::new(faces.into_iter().collect()),
        }
    }

    /// Append more faces to the script.
    pub fn extend<I: IntoIterator<Item = u8>>(&self, faces: I) {
        let mut queue = self.faces.lock().unwrap_or_else(|e| e.into_inner());
        queue.extend(faces);
    }
}

impl DiceRoller for ScriptedRoller {
    fn roll(&self) -> u8 {
        let mut queue = self.faces.lock().unwrap_or_else(|e| e.into_inner());
        queue.pop_front().unwrap_or(1)
    }
}
