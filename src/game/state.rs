//! Main duel state structure
//!
//! `DuelState` is the single mutable home of a duel: both duelists, the
//! turn/phase machine, the targeting sub-state, the RNG, the logger, and
//! the presentation cue queue. All rules operations are synchronous
//! mutations of this value; pacing is the embedding layer's business.

use crate::core::{Duelist, EffectTrigger, TrapTrigger};
use crate::game::cues::{CueQueue, DuelOutcome, MatchStatistics, PresentationCue};
use crate::game::effect_engine::EffectContext;
use crate::game::logger::{DuelLogger, LogKind};
use crate::game::phase::{Phase, Side, TurnState};
use crate::game::targeting::TargetingState;
use crate::DuelError;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Credits awarded for winning a regular duel
pub const VICTORY_REWARD: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuelState {
    /// Both duelists, indexed by `Side::index()`
    pub duelists: [Duelist; 2],

    /// Turn number, active side, and phase
    pub turn: TurnState,

    /// Pending manual-target sub-state
    pub targeting: TargetingState,

    /// Hand card currently highlighted by the player (display state only)
    pub selected_hand_card: Option<usize>,

    /// Resolution lock: no second attack may start while one is in flight
    pub resolving_attack: bool,

    /// Latched once; blocks all further battle/effect mutation
    pub ended: bool,

    /// Terminal result, set when `ended` latches
    pub outcome: Option<DuelOutcome>,

    /// Tutorial mode lifts the summon limit and the first-turn attack ban
    pub tutorial: bool,

    /// Deterministic RNG for shuffling and strategy rolls.
    /// RefCell so decisions can borrow state immutably while rolling.
    pub rng: RefCell<ChaCha12Rng>,

    pub logger: DuelLogger,

    /// Queued animation/refresh/game-over cues for the embedding layer
    pub cues: CueQueue,
}

impl DuelState {
    pub fn new(
        player_name: impl Into<String>,
        opponent_name: impl Into<String>,
        starting: Side,
        tutorial: bool,
    ) -> Self {
        let mut player = Duelist::new(player_name.into());
        let mut opponent = Duelist::new(opponent_name.into());
        player.summon_limit_bypassed = tutorial;
        opponent.summon_limit_bypassed = tutorial;

        DuelState {
            duelists: [player, opponent],
            turn: TurnState::new(starting),
            targeting: TargetingState::Idle,
            selected_hand_card: None,
            resolving_attack: false,
            ended: false,
            outcome: None,
            tutorial,
            rng: RefCell::new(ChaCha12Rng::seed_from_u64(0)),
            logger: DuelLogger::new(),
            cues: CueQueue::new(),
        }
    }

    /// Set the RNG seed for deterministic duels. Call before deck shuffling.
    pub fn seed_rng(&mut self, seed: u64) {
        *self.rng.borrow_mut() = ChaCha12Rng::seed_from_u64(seed);
    }

    pub fn duelist(&self, side: Side) -> &Duelist {
        &self.duelists[side.index()]
    }

    pub fn duelist_mut(&mut self, side: Side) -> &mut Duelist {
        &mut self.duelists[side.index()]
    }

    /// Mutable access to (this side, other side) at once
    pub fn pair_mut(&mut self, side: Side) -> (&mut Duelist, &mut Duelist) {
        let [player, opponent] = &mut self.duelists;
        match side {
            Side::Player => (player, opponent),
            Side::Opponent => (opponent, player),
        }
    }

    pub fn duelist_name(&self, side: Side) -> String {
        self.duelist(side).name.to_string()
    }

    /// Narrate an event on the current turn
    pub fn narrate(&self, kind: LogKind, message: &str) {
        self.logger.log(kind, self.turn.turn_number, message);
    }

    /// Reject an action: log the reason, mutate nothing
    pub(crate) fn reject(&self, message: &str) -> bool {
        self.narrate(LogKind::System, message);
        false
    }

    pub(crate) fn log_illegal(&self, err: DuelError) {
        match err {
            DuelError::IllegalAction(message) => self.narrate(LogKind::System, &message),
            other => self.narrate(LogKind::Warning, &other.to_string()),
        }
    }

    /// Shuffle a duelist's deck with the match RNG
    pub fn shuffle_deck(&mut self, side: Side) {
        let mut rng = self.rng.borrow_mut();
        self.duelists[side.index()].deck.shuffle(&mut *rng);
    }

    /// Draw one card for a duelist, narrating the result.
    /// Drawing from an empty deck only flags deck-out (known gap: no loss).
    pub fn draw_for(&mut self, side: Side) -> bool {
        let name = self.duelist_name(side);
        let turn = self.turn.turn_number;
        if self.duelists[side.index()].draw_card() {
            self.logger
                .log_fmt(LogKind::Draw, turn, format_args!("{name} draws a card"));
            true
        } else {
            self.logger.log_fmt(
                LogKind::System,
                turn,
                format_args!("{name} has no cards left to draw!"),
            );
            false
        }
    }

    fn check_actionable(&self, side: Side) -> bool {
        if self.ended {
            return false;
        }
        if self.turn.active != side {
            return self.reject("it is not your turn");
        }
        if self.targeting.is_pending() {
            return self.reject("choose a target for the pending effect first");
        }
        true
    }

    /// Normal-summon a monster, firing on-summon effects and trap responses
    pub fn summon(
        &mut self,
        side: Side,
        hand_index: usize,
        field_slot: usize,
        tributes: &[usize],
    ) -> bool {
        if !self.check_actionable(side) {
            return false;
        }
        if !self.turn.phase.is_main() {
            return self.reject("monsters can only be played in a main phase");
        }

        let tribute_count = tributes.len();
        match self.duelists[side.index()].summon_monster(hand_index, field_slot, tributes) {
            Err(err) => {
                self.log_illegal(err);
                false
            }
            Ok(slot) => {
                self.selected_hand_card = None;
                let name = self.duelist_name(side);
                if let Some(card) = self.duelist(side).field.monster(slot).cloned() {
                    if tribute_count > 0 {
                        self.narrate(
                            LogKind::Summon,
                            &format!(
                                "{name} tributes {tribute_count} and summons {}",
                                card.name()
                            ),
                        );
                    } else {
                        self.narrate(LogKind::Summon, &format!("{name} summons {}", card.name()));
                    }
                    self.check_reactive_effect(
                        &card,
                        EffectTrigger::OnSummon,
                        side,
                        EffectContext::on_slot(slot),
                    );
                }
                self.check_trap_response(TrapTrigger::Summon, EffectContext::default());
                self.cues.push(PresentationCue::Refresh);
                true
            }
        }
    }

    /// Set a monster face-down in defense position
    pub fn set_monster(&mut self, side: Side, hand_index: usize, field_slot: usize) -> bool {
        if !self.check_actionable(side) {
            return false;
        }
        if !self.turn.phase.is_main() {
            return self.reject("monsters can only be played in a main phase");
        }

        match self.duelists[side.index()].set_monster(hand_index, field_slot) {
            Err(err) => {
                self.log_illegal(err);
                false
            }
            Ok(_) => {
                self.selected_hand_card = None;
                let name = self.duelist_name(side);
                self.narrate(LogKind::System, &format!("{name} set a monster"));
                self.cues.push(PresentationCue::Refresh);
                true
            }
        }
    }

    /// Set a spell or trap face-down
    pub fn set_spell_trap(&mut self, side: Side, hand_index: usize, field_slot: usize) -> bool {
        if !self.check_actionable(side) {
            return false;
        }
        if !self.turn.phase.is_main() {
            return self.reject("spells and traps can only be set in a main phase");
        }

        match self.duelists[side.index()].set_spell_trap(hand_index, field_slot) {
            Err(err) => {
                self.log_illegal(err);
                false
            }
            Ok(_) => {
                self.selected_hand_card = None;
                let name = self.duelist_name(side);
                self.narrate(LogKind::System, &format!("{name} set a card"));
                self.cues.push(PresentationCue::Refresh);
                true
            }
        }
    }

    /// Toggle a monster's battle position
    pub fn change_position(&mut self, side: Side, field_slot: usize) -> bool {
        if !self.check_actionable(side) {
            return false;
        }
        if self.turn.phase == Phase::Battle {
            return self.reject("positions cannot change during the battle phase");
        }

        match self.duelists[side.index()].change_monster_position(field_slot) {
            Err(err) => {
                self.log_illegal(err);
                false
            }
            Ok(position) => {
                let card_name = self
                    .duelist(side)
                    .field
                    .monster(field_slot)
                    .map(|c| c.name().to_string())
                    .unwrap_or_default();
                self.narrate(
                    LogKind::System,
                    &format!("{card_name} is now in {} position", position.label()),
                );
                self.cues.push(PresentationCue::Refresh);
                true
            }
        }
    }

    /// Record which hand card the player is pointing at (display state)
    pub fn select_card_from_hand(&mut self, side: Side, hand_index: usize) -> bool {
        if self.ended || self.turn.active != side || self.turn.phase == Phase::Battle {
            return false;
        }
        if self.duelist(side).hand.get(hand_index).is_none() {
            return false;
        }
        self.selected_hand_card = Some(hand_index);
        true
    }

    /// Main 1 -> Battle. Blocked on turn 1 outside tutorial mode.
    pub fn enter_battle_phase(&mut self, side: Side) -> bool {
        if !self.check_actionable(side) {
            return false;
        }
        if self.turn.turn_number == 1 && !self.tutorial {
            return self.reject("you cannot attack on the first turn");
        }
        if self.turn.phase != Phase::Main1 {
            return self.reject("the battle phase has already passed");
        }
        self.turn.phase = Phase::Battle;
        self.narrate(LogKind::System, "--- Battle Phase ---");
        self.cues.push(PresentationCue::Refresh);
        true
    }

    /// Battle -> Main 2
    pub fn advance_to_main2(&mut self, side: Side) -> bool {
        if self.ended || self.turn.active != side {
            return false;
        }
        if self.turn.phase != Phase::Battle {
            return self.reject("not in the battle phase");
        }
        self.turn.phase = Phase::Main2;
        self.narrate(LogKind::System, "--- Main Phase 2 ---");
        self.cues.push(PresentationCue::Refresh);
        true
    }

    /// End the active duelist's turn: expire temporary effects, reset turn
    /// flags, hand over, and draw for the new active duelist.
    pub fn end_turn(&mut self) {
        if self.ended {
            return;
        }
        let side = self.turn.active;
        let name = self.duelist_name(side);
        self.narrate(LogKind::TurnEnd, &format!("End of {name}'s turn"));

        self.process_end_of_turn_effects(side);
        self.duelists[side.index()].reset_turn_flags();
        self.targeting = TargetingState::Idle;
        self.selected_hand_card = None;

        self.turn.next_turn();
        let new_side = self.turn.active;
        let new_name = self.duelist_name(new_side);
        self.narrate(
            LogKind::TurnStart,
            &format!("{new_name}'s turn (turn {})", self.turn.turn_number),
        );
        if self.turn.turn_number > 1 {
            self.draw_for(new_side);
        }
        self.cues.push(PresentationCue::Refresh);
    }

    /// Apply life-point damage with narration; no-op for amounts <= 0
    pub(crate) fn apply_damage(&mut self, side: Side, amount: i32, prefix: &str) {
        if amount <= 0 {
            return;
        }
        self.duelists[side.index()].take_damage(amount);
        let name = self.duelist_name(side);
        let turn = self.turn.turn_number;
        if prefix.is_empty() {
            self.logger.log_fmt(
                LogKind::Damage,
                turn,
                format_args!("{name} takes {amount} damage"),
            );
        } else {
            self.logger.log_fmt(
                LogKind::Damage,
                turn,
                format_args!("{prefix} {name} takes {amount} damage"),
            );
        }
        self.cues.push(PresentationCue::Damage { side, amount });
    }

    /// Latch the game-over state once either duelist has lost.
    /// Returns whether the duel is over.
    pub fn check_duel_end(&mut self) -> bool {
        if self.ended {
            return true;
        }
        let player_lost = self.duelists[Side::Player.index()].has_lost();
        let opponent_lost = self.duelists[Side::Opponent.index()].has_lost();
        if !player_lost && !opponent_lost {
            return false;
        }

        self.ended = true;
        // Checked in this order: a simultaneous wipe counts as a player loss
        let winner = if player_lost {
            Side::Player.other()
        } else {
            Side::Player
        };
        let reward = if winner == Side::Player && !self.tutorial {
            VICTORY_REWARD
        } else {
            0
        };

        let name = self.duelist_name(winner);
        self.narrate(LogKind::DuelEnd, &format!("{name} wins the duel"));
        if reward > 0 {
            self.narrate(LogKind::System, &format!("Reward: {reward} credits"));
        }

        let outcome = DuelOutcome {
            winner,
            reward,
            stats: self.match_statistics(),
        };
        self.outcome = Some(outcome.clone());
        self.cues.push(PresentationCue::DuelOver(outcome));
        true
    }

    /// End-of-duel statistics from the player's perspective
    pub fn match_statistics(&self) -> MatchStatistics {
        let player = self.duelist(Side::Player);
        let mvp_card = player
            .field
            .occupied_monsters()
            .map(|(_, c)| c)
            .chain(player.graveyard.iter())
            .filter(|c| c.is_monster())
            .max_by_key(|c| c.attack_without_temp())
            .map(|c| c.name().clone());

        MatchStatistics {
            turns: self.turn.turn_number,
            player_final_lp: player.life_points,
            opponent_final_lp: self.duelist(Side::Opponent).life_points,
            mvp_card,
        }
    }
}
