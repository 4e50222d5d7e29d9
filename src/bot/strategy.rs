//! Keep-selection heuristic for bot turns.
//!
//! A bot commits to chasing one end of the die: the low faces (1 is best)
//! or the high faces (6 is best). Dice already kept lock the regime in;
//! before anything is kept, the regime is whichever side the current roll
//! leans toward.

use crate::game::logic::{Game, GameAction};
use crate::game::phase::GamePhase;

/// Which end of the die the bot is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Low,
    High,
}

/// Fixed value table. Low favors 1 > 2 > 3, high favors 6 > 5 > 4;
/// off-regime faces are worthless.
pub fn face_score(regime: Regime, face: u8) -> u8 {
    match (regime, face) {
        (Regime::Low, 1) | (Regime::High, 6) => 3,
        (Regime::Low, 2) | (Regime::High, 5) => 2,
        (Regime::Low, 3) | (Regime::High, 4) => 1,
        _ => 0,
    }
}

fn hand_score(regime: Regime, faces: &[u8]) -> u32 {
    faces.iter().map(|&f| u32::from(face_score(regime, f))).sum()
}

/// Regime the kept dice lean toward, falling back to whichever side scores
/// more on the current table. Full ties go low.
pub fn pick_regime(kept: &[u8], table: &[u8]) -> Regime {
    let kept_low = hand_score(Regime::Low, kept);
    let kept_high = hand_score(Regime::High, kept);
    if kept_low > kept_high {
        return Regime::Low;
    }
    if kept_high > kept_low {
        return Regime::High;
    }
    if hand_score(Regime::High, table) > hand_score(Regime::Low, table) {
        Regime::High
    } else {
        Regime::Low
    }
}

/// Indices of table dice to keep on a regular turn: every top-value die,
/// else one mid-value die, else the single best on the table. Never empty
/// while the table has dice.
pub fn choose_turn_keeps(kept: &[u8], table: &[u8]) -> Vec<usize> {
    if table.is_empty() {
        return Vec::new();
    }
    let regime = pick_regime(kept, table);

    let top: Vec<usize> = table
        .iter()
        .enumerate()
        .filter(|(_, &face)| face_score(regime, face) == 3)
        .map(|(i, _)| i)
        .collect();
    if !top.is_empty() {
        return top;
    }

    if let Some(mid) = table.iter().position(|&face| face_score(regime, face) == 2) {
        return vec![mid];
    }

    let best = table
        .iter()
        .enumerate()
        .max_by_key(|(_, &face)| face_score(regime, face))
        .map(|(i, _)| i)
        .unwrap_or(0);
    vec![best]
}

/// Indices of every table die showing the killer face.
pub fn choose_attack_keeps(table: &[u8], killer_value: u8) -> Vec<usize> {
    table
        .iter()
        .enumerate()
        .filter(|(_, &face)| face == killer_value)
        .map(|(i, _)| i)
        .collect()
}

/// The action a bot seated as `bot_id` would take right now, or `None`
/// when nothing is expected of it.
pub fn next_action(game: &Game, bot_id: &str) -> Option<GameAction> {
    if game.phase() == GamePhase::StartingRolls {
        let me = game.players().iter().find(|p| p.id == bot_id)?;
        return (!me.is_ready).then_some(GameAction::ConfirmReady);
    }

    if game.current_player().map(|p| p.id.as_str()) != Some(bot_id) {
        return None;
    }

    match game.phase() {
        GamePhase::TurnPending => Some(GameAction::StartTurn),
        GamePhase::TurnChoice => Some(GameAction::KeepDice(choose_turn_keeps(
            game.kept_dice(),
            game.table_dice(),
        ))),
        GamePhase::RegenRoll => Some(GameAction::RollRegen),
        GamePhase::RegenResult => Some(GameAction::EndRegen),
        GamePhase::AttackPending => Some(GameAction::RollAttack),
        GamePhase::AttackChoice => Some(GameAction::KeepAttackDice(choose_attack_keeps(
            game.table_dice(),
            game.killer_value(),
        ))),
        GamePhase::AttackFinished | GamePhase::AttackMissed => Some(GameAction::ResolveAttack),
        GamePhase::AttackResolved => Some(GameAction::NextVictim),
        GamePhase::Waiting | GamePhase::StartingRolls | GamePhase::GameOver => None,
    }
}
