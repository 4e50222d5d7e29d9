use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Where a room currently sits in the turn state machine. Every inbound
/// action names exactly the phases it is legal in; anything else is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    /// Room is open, players can still join.
    Waiting,
    /// Initial five-die rolls are on the table, waiting for confirmations.
    StartingRolls,
    /// A turn is assigned but the player has not rolled yet.
    TurnPending,
    /// Five dice on the table, the player picks which to keep.
    TurnChoice,
    /// Regeneration earned, waiting for the bonus die.
    RegenRoll,
    /// Bonus die shown, waiting for acknowledgement.
    RegenResult,
    /// A victim is lined up, waiting for the attack roll.
    AttackPending,
    /// Attack dice on the table, the killer picks matching faces.
    AttackChoice,
    /// A reroll came up empty, damage total is final.
    AttackFinished,
    /// The very first attack roll had no killer face.
    AttackMissed,
    /// Damage applied, waiting to move to the next victim.
    AttackResolved,
    GameOver,
}

impl GamePhase {
    /// True for every phase of the killer sub-loop, i.e. whenever a victim
    /// is on the hook.
    pub fn in_attack(self) -> bool {
        matches!(
            self,
            GamePhase::AttackPending
                | GamePhase::AttackChoice
                | GamePhase::AttackFinished
                | GamePhase::AttackMissed
                | GamePhase::AttackResolved
        )
    }

    pub fn accepts_joins(self) -> bool {
        matches!(self, GamePhase::Waiting)
    }
}
