// The game structure is owned by the room registry and locked per room; every
// mutation funnels through the methods here so phase and turn checks cannot be
// bypassed by a handler.
use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::game::dice::DiceRoller;
use crate::game::phase::GamePhase;
use crate::game::player::Player;
use crate::game::scoring::{score_hand, HandOutcome};

pub const HAND_SIZE: usize = 5;
pub const MIN_PLAYERS: usize = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    /// The actor is not allowed to take this action right now. Dropped
    /// silently, like any stale click.
    #[error("not this player's action")]
    InvalidActor,
    /// The action does not exist in the current phase. Also dropped silently.
    #[error("action not valid in phase {0}")]
    InvalidPhase(GamePhase),
    /// The action was legal but its payload was not. Reported back to the
    /// acting connection only.
    #[error("{0}")]
    InvalidSelection(String),
    #[error("at least two players are needed")]
    NotEnoughPlayers,
}

/// Sound effect hint attached to a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SoundCue {
    Roll,
    Hit,
    Miss,
    Regen,
    Bonus,
    Victory,
}

/// Transient announcement produced by a transition, broadcast to the room on
/// top of the regular state snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GameNote {
    pub text: String,
    pub sound: Option<SoundCue>,
}

impl GameNote {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sound: None,
        }
    }

    pub fn with_sound(text: impl Into<String>, sound: SoundCue) -> Self {
        Self {
            text: text.into(),
            sound: Some(sound),
        }
    }
}

/// Turn actions. Everything a seated player (human or bot) can do once the
/// game has started goes through [`Game::apply`] with one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    ConfirmReady,
    StartTurn,
    KeepDice(Vec<usize>),
    RollRegen,
    EndRegen,
    RollAttack,
    KeepAttackDice(Vec<usize>),
    ResolveAttack,
    NextVictim,
}

/// What a departure did to the room.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaveOutcome {
    NotMember,
    Left {
        notes: Vec<GameNote>,
        promoted_owner: Option<String>,
        close_room: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Game {
    id: String,
    display_name: String,
    players: Vec<Player>,
    phase: GamePhase,
    current_turn: usize,
    table_dice: Vec<u8>,
    kept_dice: Vec<u8>,
    killer_value: u8,
    victim_queue: VecDeque<usize>,
    current_victim: Option<usize>,
    accumulated_damage: u32,
    message: String,
    winner_name: Option<String>,
    owner_id: Option<String>,
    // Ids of players that were not negative when the current turn began,
    // used to break ties when a killer round wipes out every survivor.
    alive_at_turn_start: HashSet<String>,
}

impl Game {
    pub fn new(id: String, display_name: String) -> Self {
        Self {
            id,
            display_name,
            players: Vec::new(),
            phase: GamePhase::Waiting,
            current_turn: 0,
            table_dice: Vec::new(),
            kept_dice: Vec::new(),
            killer_value: 0,
            victim_queue: VecDeque::new(),
            current_victim: None,
            accumulated_damage: 0,
            message: "Waiting for players...".to_string(),
            winner_name: None,
            owner_id: None,
            alive_at_turn_start: HashSet::new(),
        }
    }

    // --- lobby lifecycle ---

    pub fn join(&mut self, id: String, name: String) -> Result<Vec<GameNote>, GameError> {
        if !self.phase.accepts_joins() {
            return Err(GameError::InvalidPhase(self.phase));
        }
        if self.players.iter().any(|p| p.id == id) {
            return Err(GameError::InvalidActor);
        }
        self.message = format!("{} joined the room.", name);
        self.players.push(Player::human(id.clone(), name));
        if self.owner_id.is_none() {
            self.owner_id = Some(id);
        }
        Ok(vec![])
    }

    pub fn add_bot(&mut self, actor: &str) -> Result<Vec<GameNote>, GameError> {
        if self.phase != GamePhase::Waiting {
            return Err(GameError::InvalidPhase(self.phase));
        }
        if self.owner_id.as_deref() != Some(actor) {
            return Err(GameError::InvalidActor);
        }
        let bot = Player::bot();
        self.message = format!("{} joined the room.", bot.name);
        self.players.push(bot);
        Ok(vec![])
    }

    pub fn start(&mut self, actor: &str, roller: &dyn DiceRoller) -> Result<Vec<GameNote>, GameError> {
        if self.phase != GamePhase::Waiting {
            return Err(GameError::InvalidPhase(self.phase));
        }
        if self.owner_id.as_deref() != Some(actor) {
            return Err(GameError::InvalidActor);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }
        Ok(self.begin_starting_rolls(roller))
    }

    pub fn replay(&mut self, actor: &str, roller: &dyn DiceRoller) -> Result<Vec<GameNote>, GameError> {
        if self.phase != GamePhase::GameOver {
            return Err(GameError::InvalidPhase(self.phase));
        }
        if self.owner_id.as_deref() != Some(actor) {
            return Err(GameError::InvalidActor);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::NotEnoughPlayers);
        }
        Ok(self.begin_starting_rolls(roller))
    }

    pub fn remove_player(&mut self, id: &str) -> LeaveOutcome {
        let Some(removed_idx) = self.players.iter().position(|p| p.id == id) else {
            return LeaveOutcome::NotMember;
        };
        let removed = self.players.remove(removed_idx);

        let mut promoted = None;
        if self.owner_id.as_deref() == Some(id) {
            self.owner_id = self.players.iter().find(|p| !p.is_bot).map(|p| p.id.clone());
            promoted = self.owner_id.clone();
        }
        // Bots cannot hold a room open on their own.
        if !self.players.iter().any(|p| !p.is_bot) {
            return LeaveOutcome::Left {
                notes: vec![],
                promoted_owner: None,
                close_room: true,
            };
        }

        self.alive_at_turn_start.remove(id);
        self.victim_queue = self
            .victim_queue
            .iter()
            .filter(|&&v| v != removed_idx)
            .map(|&v| if v > removed_idx { v - 1 } else { v })
            .collect();
        let victim_left = self.current_victim == Some(removed_idx);
        if let Some(v) = self.current_victim {
            if v > removed_idx {
                self.current_victim = Some(v - 1);
            }
        }
        let was_current = removed_idx == self.current_turn;
        if removed_idx < self.current_turn {
            self.current_turn -= 1;
        } else if self.current_turn >= self.players.len() {
            self.current_turn = 0;
        }

        self.message = format!("{} left the game.", removed.name);
        let mut notes = Vec::new();
        if let Some(owner_id) = &promoted {
            if let Some(owner) = self.players.iter().find(|p| &p.id == owner_id) {
                notes.push(GameNote::plain(format!("{} now owns the room.", owner.name)));
            }
        }

        match self.phase {
            GamePhase::Waiting | GamePhase::GameOver => {}
            GamePhase::StartingRolls => {
                if self.players.iter().all(|p| p.is_ready) {
                    notes.extend(self.begin_first_turn());
                }
            }
            _ => {
                if was_current {
                    notes.extend(self.reset_turn_to_current());
                } else if victim_left {
                    notes.extend(self.prepare_next_victim());
                }
            }
        }

        LeaveOutcome::Left {
            notes,
            promoted_owner: promoted,
            close_room: false,
        }
    }

    // --- turn actions ---

    /// Validate and run a turn action for `actor`. Phase and turn ownership
    /// are checked here, so the individual transitions below can assume a
    /// legal caller.
    pub fn apply(
        &mut self,
        actor: &str,
        action: GameAction,
        roller: &dyn DiceRoller,
    ) -> Result<Vec<GameNote>, GameError> {
        if action == GameAction::ConfirmReady {
            if self.phase != GamePhase::StartingRolls {
                return Err(GameError::InvalidPhase(self.phase));
            }
            return self.confirm_ready(actor);
        }

        let legal_phases: &[GamePhase] = match action {
            GameAction::StartTurn => &[GamePhase::TurnPending],
            GameAction::KeepDice(_) => &[GamePhase::TurnChoice],
            GameAction::RollRegen => &[GamePhase::RegenRoll],
            GameAction::EndRegen => &[GamePhase::RegenResult],
            GameAction::RollAttack => &[GamePhase::AttackPending],
            GameAction::KeepAttackDice(_) => &[GamePhase::AttackChoice],
            GameAction::ResolveAttack => &[GamePhase::AttackFinished, GamePhase::AttackMissed],
            GameAction::NextVictim => &[GamePhase::AttackResolved],
            GameAction::ConfirmReady => unreachable!(),
        };
        if !legal_phases.contains(&self.phase) {
            return Err(GameError::InvalidPhase(self.phase));
        }
        if self.current_player().map(|p| p.id.as_str()) != Some(actor) {
            return Err(GameError::InvalidActor);
        }

        match action {
            GameAction::StartTurn => Ok(self.start_turn(roller)),
            GameAction::KeepDice(indices) => self.keep_dice(&indices, roller),
            GameAction::RollRegen => Ok(self.roll_regen(roller)),
            GameAction::EndRegen => Ok(self.pass_to_next_player()),
            GameAction::RollAttack => Ok(self.roll_attack(roller)),
            GameAction::KeepAttackDice(indices) => self.keep_attack_dice(&indices, roller),
            GameAction::ResolveAttack => Ok(self.resolve_attack()),
            GameAction::NextVictim => Ok(self.prepare_next_victim()),
            GameAction::ConfirmReady => unreachable!(),
        }
    }

    fn confirm_ready(&mut self, actor: &str) -> Result<Vec<GameNote>, GameError> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == actor)
            .ok_or(GameError::InvalidActor)?;
        if player.is_ready {
            return Err(GameError::InvalidActor);
        }
        player.is_ready = true;
        let name = player.name.clone();
        if self.players.iter().all(|p| p.is_ready) {
            Ok(self.begin_first_turn())
        } else {
            self.message = format!("{} is ready.", name);
            Ok(vec![])
        }
    }

    fn begin_starting_rolls(&mut self, roller: &dyn DiceRoller) -> Vec<GameNote> {
        self.clear_turn_dice();
        self.current_turn = 0;
        self.winner_name = None;
        self.alive_at_turn_start.clear();
        let mut digest = Vec::with_capacity(self.players.len());
        for player in &mut self.players {
            let roll = roller.roll_hand(HAND_SIZE);
            let total: i32 = roll.iter().map(|&d| i32::from(d)).sum();
            player.hit_points = total;
            player.initial_roll = roll;
            player.is_ready = false;
            digest.push(format!("{}: {}", player.name, total));
        }
        self.phase = GamePhase::StartingRolls;
        self.message = "Starting rolls are in. Confirm your hit points!".to_string();
        vec![GameNote::with_sound(
            format!("Starting hit points: {}", digest.join(", ")),
            SoundCue::Roll,
        )]
    }

    fn begin_first_turn(&mut self) -> Vec<GameNote> {
        // Lowest starting total plays first; ties keep join order.
        self.players.sort_by_key(|p| p.hit_points);
        self.current_turn = 0;
        self.clear_turn_dice();
        self.snapshot_alive();
        self.phase = GamePhase::TurnPending;
        self.message = format!("The game begins! {} plays first.", self.players[0].name);
        vec![]
    }

    fn start_turn(&mut self, roller: &dyn DiceRoller) -> Vec<GameNote> {
        self.kept_dice.clear();
        self.table_dice = roller.roll_hand(HAND_SIZE);
        self.phase = GamePhase::TurnChoice;
        self.message = format!(
            "{} rolls. Pick the dice to keep!",
            self.players[self.current_turn].name
        );
        vec![]
    }

    fn keep_dice(
        &mut self,
        indices: &[usize],
        roller: &dyn DiceRoller,
    ) -> Result<Vec<GameNote>, GameError> {
        let picked = self.sorted_selection(indices)?;
        for i in picked {
            let die = self.table_dice.remove(i);
            self.kept_dice.push(die);
        }
        if self.kept_dice.len() == HAND_SIZE {
            Ok(self.score_kept_hand())
        } else {
            self.table_dice = roller.roll_hand(HAND_SIZE - self.kept_dice.len());
            self.message = "Rerolling the remaining dice...".to_string();
            Ok(vec![])
        }
    }

    fn score_kept_hand(&mut self) -> Vec<GameNote> {
        let sum: u32 = self.kept_dice.iter().map(|&d| u32::from(d)).sum();
        let name = self.players[self.current_turn].name.clone();
        match score_hand(sum) {
            HandOutcome::Killer { value } => {
                self.killer_value = value;
                let mut notes = vec![GameNote::with_sound(
                    format!("Score {}: KILLER {}! {} goes on the attack!", sum, value, name),
                    SoundCue::Hit,
                )];
                notes.extend(self.init_attack_round());
                notes
            }
            HandOutcome::Regenerate => {
                self.phase = GamePhase::RegenRoll;
                self.message = format!("Score {}: regeneration! Roll the bonus die.", sum);
                vec![GameNote::with_sound(
                    format!("Score {}: {} regenerates.", sum, name),
                    SoundCue::Regen,
                )]
            }
            HandOutcome::LoseHitPoints { amount } => {
                self.players[self.current_turn].hit_points -= amount;
                let mut notes = vec![GameNote::with_sound(
                    format!("Score {}: {} loses {} HP.", sum, name, amount),
                    SoundCue::Hit,
                )];
                notes.extend(self.pass_to_next_player());
                notes
            }
            HandOutcome::Nothing => {
                let mut notes = vec![GameNote::plain(format!("Score {}: nothing happens.", sum))];
                notes.extend(self.pass_to_next_player());
                notes
            }
        }
    }

    fn roll_regen(&mut self, roller: &dyn DiceRoller) -> Vec<GameNote> {
        let face = roller.roll();
        self.table_dice = vec![face];
        let player = &mut self.players[self.current_turn];
        player.hit_points += i32::from(face);
        let name = player.name.clone();
        self.phase = GamePhase::RegenResult;
        self.message = format!("Bonus die: {}. {} regains {} HP.", face, name, face);
        vec![GameNote::with_sound(
            format!("{} rolls a {} and regains {} HP.", name, face, face),
            SoundCue::Regen,
        )]
    }

    // --- killer sub-loop ---

    fn init_attack_round(&mut self) -> Vec<GameNote> {
        self.victim_queue.clear();
        let count = self.players.len();
        for offset in 1..count {
            self.victim_queue
                .push_back((self.current_turn + offset) % count);
        }
        self.prepare_next_victim()
    }

    fn prepare_next_victim(&mut self) -> Vec<GameNote> {
        match self.victim_queue.pop_front() {
            None => {
                self.current_victim = None;
                let mut notes = vec![GameNote::plain(
                    "Killer round over. Back to the normal game.",
                )];
                notes.extend(self.pass_to_next_player());
                notes
            }
            Some(idx) => {
                self.current_victim = Some(idx);
                self.accumulated_damage = 0;
                self.kept_dice.clear();
                self.table_dice.clear();
                self.phase = GamePhase::AttackPending;
                self.message = format!("Ready to attack {}?", self.players[idx].name);
                vec![]
            }
        }
    }

    fn roll_attack(&mut self, roller: &dyn DiceRoller) -> Vec<GameNote> {
        self.table_dice = roller.roll_hand(HAND_SIZE);
        if self.table_dice.contains(&self.killer_value) {
            self.phase = GamePhase::AttackChoice;
            self.message = format!("Pick your {}s!", self.killer_value);
            vec![]
        } else {
            self.phase = GamePhase::AttackMissed;
            self.message = "No killer dice! Attack missed.".to_string();
            let victim = self
                .current_victim
                .map(|idx| self.players[idx].name.clone())
                .unwrap_or_default();
            vec![GameNote::with_sound(
                format!("Attack on {} missed.", victim),
                SoundCue::Miss,
            )]
        }
    }

    fn keep_attack_dice(
        &mut self,
        indices: &[usize],
        roller: &dyn DiceRoller,
    ) -> Result<Vec<GameNote>, GameError> {
        let picked = self.sorted_selection(indices)?;
        for &i in &picked {
            if self.table_dice[i] != self.killer_value {
                return Err(GameError::InvalidSelection(format!(
                    "you can only keep {}s",
                    self.killer_value
                )));
            }
        }

        let taken = picked.len();
        for i in picked {
            let die = self.table_dice.remove(i);
            self.accumulated_damage += u32::from(die);
            self.kept_dice.push(die);
        }
        let attacker = self.players[self.current_turn].name.clone();
        let mut notes = vec![GameNote::plain(format!(
            "{} keeps {} dice. Damage: {}.",
            attacker, taken, self.accumulated_damage
        ))];

        if self.kept_dice.len() == HAND_SIZE {
            // Full house of killer dice: the hand resets and five fresh dice
            // keep the attack alive.
            self.kept_dice.clear();
            notes.push(GameNote::with_sound(
                "FULL! Five dice kept: five fresh dice!",
                SoundCue::Bonus,
            ));
            self.table_dice = roller.roll_hand(HAND_SIZE);
            if self.table_dice.contains(&self.killer_value) {
                self.message = "BONUS! More hits, keep going!".to_string();
            } else {
                notes.push(GameNote::plain(format!(
                    "Bonus roll without a {}. The attack ends.",
                    self.killer_value
                )));
                self.finish_attack();
            }
        } else {
            self.table_dice = roller.roll_hand(HAND_SIZE - self.kept_dice.len());
            if self.table_dice.contains(&self.killer_value) {
                self.message = "More hits! Keep and reroll...".to_string();
            } else {
                notes.push(GameNote::plain(format!(
                    "Reroll without a {}. The attack ends.",
                    self.killer_value
                )));
                self.finish_attack();
            }
        }
        Ok(notes)
    }

    fn finish_attack(&mut self) {
        self.phase = GamePhase::AttackFinished;
        self.message = format!("Attack over. Total damage: {}.", self.accumulated_damage);
    }

    fn resolve_attack(&mut self) -> Vec<GameNote> {
        let mut notes = Vec::new();
        let damage = self.accumulated_damage;
        if let Some(idx) = self.current_victim {
            if damage > 0 {
                let victim = &mut self.players[idx];
                victim.hit_points -= damage as i32;
                let victim_name = victim.name.clone();
                notes.push(GameNote::with_sound(
                    format!("BOOM! {} damage to {}!", damage, victim_name),
                    SoundCue::Hit,
                ));
                self.message = format!("{} takes {} damage.", victim_name, damage);
            } else {
                self.message = "No damage dealt.".to_string();
            }
        }
        self.phase = GamePhase::AttackResolved;
        notes
    }

    // --- turn rotation and endings ---

    fn pass_to_next_player(&mut self) -> Vec<GameNote> {
        if let Some(notes) = self.try_finish_game() {
            return notes;
        }
        self.current_turn = (self.current_turn + 1) % self.players.len();
        self.begin_pending_turn()
    }

    /// Like [`Self::pass_to_next_player`] but keeps the index where it is,
    /// for when a departure already shifted the seat under the cursor.
    fn reset_turn_to_current(&mut self) -> Vec<GameNote> {
        if let Some(notes) = self.try_finish_game() {
            return notes;
        }
        self.begin_pending_turn()
    }

    fn begin_pending_turn(&mut self) -> Vec<GameNote> {
        self.clear_turn_dice();
        self.snapshot_alive();
        self.phase = GamePhase::TurnPending;
        self.message = format!("{}'s turn to play.", self.players[self.current_turn].name);
        vec![]
    }

    /// Every survivor check happens here and only here. Victims that go
    /// negative mid killer round stay in their seats until the attacker's
    /// turn actually passes.
    fn try_finish_game(&mut self) -> Option<Vec<GameNote>> {
        if self.players.len() <= 1 {
            return None;
        }
        let survivors: Vec<&Player> = self.players.iter().filter(|p| p.is_alive()).collect();
        match survivors.len() {
            1 => {
                let name = survivors[0].name.clone();
                self.winner_name = Some(name.clone());
                self.phase = GamePhase::GameOver;
                self.message = format!("VICTORY! {} is the last one standing!", name);
                Some(vec![GameNote::with_sound(
                    format!("{} wins the game!", name),
                    SoundCue::Victory,
                )])
            }
            0 => {
                self.phase = GamePhase::GameOver;
                match self.tie_break_winner() {
                    Some(name) => {
                        self.winner_name = Some(name.clone());
                        self.message =
                            format!("Everyone went negative! {} held out the longest.", name);
                        Some(vec![GameNote::with_sound(
                            format!("{} wins the game!", name),
                            SoundCue::Victory,
                        )])
                    }
                    None => {
                        self.winner_name = Some("no one".to_string());
                        self.message = "Everyone is negative... a draw?".to_string();
                        Some(vec![GameNote::plain("Nobody survived the bloodbath.")])
                    }
                }
            }
            _ => None,
        }
    }

    /// Break an everyone-negative ending: prefer the players that were still
    /// standing when the turn began, fall back to the whole table, and
    /// declare whoever holds the unique highest total. No unique highest
    /// means no winner.
    fn tie_break_winner(&self) -> Option<String> {
        let at_turn_start: Vec<&Player> = self
            .players
            .iter()
            .filter(|p| self.alive_at_turn_start.contains(&p.id))
            .collect();
        let candidates = if at_turn_start.is_empty() {
            self.players.iter().collect()
        } else {
            at_turn_start
        };
        let best = candidates.iter().map(|p| p.hit_points).max()?;
        let mut top = candidates.iter().filter(|p| p.hit_points == best);
        let winner = top.next()?;
        if top.next().is_some() {
            None
        } else {
            Some(winner.name.clone())
        }
    }

    // --- helpers ---

    /// Deduplicate and validate a dice selection, returned in descending
    /// order so removals do not shift the remaining indices.
    fn sorted_selection(&self, indices: &[usize]) -> Result<Vec<usize>, GameError> {
        if indices.is_empty() {
            return Err(GameError::InvalidSelection(
                "keep at least one die".to_string(),
            ));
        }
        let mut picked = indices.to_vec();
        picked.sort_unstable_by(|a, b| b.cmp(a));
        picked.dedup();
        if picked.first().is_some_and(|&i| i >= self.table_dice.len()) {
            return Err(GameError::InvalidSelection(
                "die index out of range".to_string(),
            ));
        }
        Ok(picked)
    }

    fn clear_turn_dice(&mut self) {
        self.table_dice.clear();
        self.kept_dice.clear();
        self.killer_value = 0;
        self.victim_queue.clear();
        self.current_victim = None;
        self.accumulated_damage = 0;
    }

    fn snapshot_alive(&mut self) {
        self.alive_at_turn_start = self
            .players
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| p.id.clone())
            .collect();
    }

    // --- accessors ---

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn has_player(&self, id: &str) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_turn)
    }

    pub fn current_victim(&self) -> Option<&Player> {
        if !self.phase.in_attack() {
            return None;
        }
        self.current_victim.and_then(|idx| self.players.get(idx))
    }

    pub fn table_dice(&self) -> &[u8] {
        &self.table_dice
    }

    pub fn kept_dice(&self) -> &[u8] {
        &self.kept_dice
    }

    pub fn killer_value(&self) -> u8 {
        self.killer_value
    }

    pub fn accumulated_damage(&self) -> u32 {
        self.accumulated_damage
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner_name.as_deref()
    }

    pub fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }

    pub fn human_count(&self) -> usize {
        self.players.iter().filter(|p| !p.is_bot).count()
    }
}
