//! Opponent strategy engine
//!
//! A strategy is plain composition over `DuelState`: it reads the board and
//! issues the same action calls a human-driven caller would. Three
//! difficulty tiers share the turn structure and differ in target selection
//! and risk tolerance.

use crate::core::{CardInstance, EffectKind, EffectTrigger, Position};
use crate::game::effect_engine::EffectContext;
use crate::game::logger::LogKind;
use crate::game::phase::{Phase, Side};
use crate::game::state::DuelState;
use crate::game::targeting::SpellOrigin;
use crate::core::TrapTrigger;
use crate::zones::FIELD_SLOTS;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Opponent difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

/// Decision-making for one side of the table
#[derive(Debug, Clone)]
pub struct OpponentStrategy {
    pub side: Side,
    pub difficulty: Difficulty,
}

/// Snapshot of a potential attack target
struct TargetInfo {
    slot: usize,
    attack: i32,
    defense: i32,
    position: Position,
}

impl OpponentStrategy {
    pub fn new(difficulty: Difficulty, side: Side) -> Self {
        OpponentStrategy { difficulty, side }
    }

    /// Play one full turn: main-phase decisions, then the battle phase
    /// (never on turn 1). The caller ends the turn afterwards.
    pub fn take_turn(&self, state: &mut DuelState) {
        if state.ended || state.turn.active != self.side {
            return;
        }

        // A board-wipe play is considered decisive: nothing else this turn
        if self.try_global_disruption(state) {
            return;
        }
        self.main_phase(state, false);

        if state.turn.turn_number > 1 && !state.ended && state.enter_battle_phase(self.side) {
            self.execute_battle_phase(state);
            if !state.ended && state.turn.phase == Phase::Battle {
                state.advance_to_main2(self.side);
            }
        }
    }

    fn main_phase(&self, state: &mut DuelState, reentered: bool) {
        if state.ended {
            return;
        }
        if self.difficulty != Difficulty::Easy {
            self.try_situational_spell(state);
        }
        if self.difficulty == Difficulty::Hard
            && !reentered
            && self.try_field_monster_effects(state)
        {
            // Re-evaluate once with the refreshed hand
            self.main_phase(state, true);
            return;
        }
        self.try_summon(state);
        self.try_set_trap(state);
    }

    /// Flip a set board-wipe card when the opponent has more back-row cards
    fn try_global_disruption(&self, state: &mut DuelState) -> bool {
        let me = state.duelist(self.side);
        let Some(slot) = me
            .field
            .occupied_spell_traps()
            .find(|(_, c)| {
                matches!(
                    c.effect().map(|e| &e.kind),
                    Some(EffectKind::DestroyAllSpellTraps)
                )
            })
            .map(|(slot, _)| slot)
        else {
            return false;
        };

        let opponent_count = state.duelist(self.side.other()).field.spell_trap_count();
        let own_count = state.duelist(self.side).field.spell_trap_count();
        if opponent_count <= own_count {
            return false;
        }
        state.activate_spell_trap(self.side, SpellOrigin::Field { slot })
    }

    /// Scan the hand for the first situational spell worth playing
    /// (normal and hard tiers only)
    fn try_situational_spell(&self, state: &mut DuelState) -> bool {
        let hand_len = state.duelist(self.side).hand.len();
        for index in 0..hand_len {
            let Some(card) = state.duelist(self.side).hand.get(index).cloned() else {
                break;
            };
            if !card.def.is_spell() {
                continue;
            }
            let Some(effect) = card.effect() else {
                continue;
            };

            let used = match effect.kind.clone() {
                // Search and recovery when the hand has room
                EffectKind::SearchByTag { .. }
                | EffectKind::SearchByTagOrDraw { .. }
                | EffectKind::RecoverStrongestFromGraveyard => {
                    hand_len < 7 && self.cast_spell(state, index, EffectContext::default())
                }
                // Boost only when it converts a losing matchup into a kill
                EffectKind::BoostTarget { amount } => {
                    match self.find_best_boost_target(state, amount) {
                        Some(slot) => self.cast_spell(state, index, EffectContext::on_slot(slot)),
                        None => false,
                    }
                }
                // Steal when a slot is free and there is something to take
                EffectKind::StealStrongest => {
                    let opponent_has_monster =
                        state.duelist(self.side.other()).field.monster_count() > 0;
                    let own_slot_free = state
                        .duelist(self.side)
                        .field
                        .first_empty_monster_slot()
                        .is_some();
                    opponent_has_monster
                        && own_slot_free
                        && self.cast_spell(state, index, EffectContext::default())
                }
                // Halve when it turns the strongest matchup winnable
                EffectKind::HalveStrongestAtk => {
                    self.halving_enables_trade(state)
                        && self.cast_spell(state, index, EffectContext::default())
                }
                // Revive when the graveyard has a target and a slot is free
                EffectKind::ReviveWeakest => {
                    let has_target = state
                        .duelist(self.side)
                        .graveyard
                        .iter()
                        .any(|c| c.is_monster() && c.level() <= 4);
                    let own_slot_free = state
                        .duelist(self.side)
                        .field
                        .first_empty_monster_slot()
                        .is_some();
                    has_target
                        && own_slot_free
                        && self.cast_spell(state, index, EffectContext::default())
                }
                _ => false,
            };
            if used {
                return true;
            }
        }
        false
    }

    /// Discard the spell as its cost and resolve it with the chosen
    /// context. Targeted casts give the opponent's counter-traps their
    /// response window; the cost stays paid when countered.
    fn cast_spell(&self, state: &mut DuelState, hand_index: usize, ctx: EffectContext) -> bool {
        let card = {
            let duelist = state.duelist_mut(self.side);
            if hand_index < duelist.hand.len() {
                Some(duelist.hand.remove(hand_index))
            } else {
                None
            }
        };
        let Some(card) = card else {
            return false;
        };
        state.duelist_mut(self.side).graveyard.add(card.clone());

        if ctx.target_slot.is_some()
            && state.check_trap_response(TrapTrigger::SpellTarget, EffectContext::default())
        {
            state.narrate(LogKind::System, &format!("{} was negated", card.name()));
            return true;
        }
        state.resolve_effect(&card, self.side, ctx);
        true
    }

    /// Hard tier: fire usable on-field monster effects (deck searches)
    /// when the hand has room
    fn try_field_monster_effects(&self, state: &mut DuelState) -> bool {
        let mut acted = false;
        for slot in 0..FIELD_SLOTS {
            if state.duelist(self.side).hand.len() >= 7 {
                break;
            }
            let Some(card) = state.duelist(self.side).field.monster(slot).cloned() else {
                continue;
            };
            let searches = matches!(
                card.effect_on(EffectTrigger::OnSummon).map(|e| &e.kind),
                Some(EffectKind::SearchByTag { .. } | EffectKind::SearchByTagOrDraw { .. })
            );
            if searches {
                state.check_reactive_effect(
                    &card,
                    EffectTrigger::OnSummon,
                    self.side,
                    EffectContext::on_slot(slot),
                );
                acted = true;
            }
        }
        acted
    }

    /// Summon the strongest monster the current field resources allow
    fn try_summon(&self, state: &mut DuelState) -> bool {
        if state.duelist(self.side).has_normal_summoned {
            return false;
        }

        let mut monsters: Vec<(usize, CardInstance)> = state
            .duelist(self.side)
            .hand
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_monster())
            .map(|(i, c)| (i, c.clone()))
            .collect();
        monsters.sort_by(|a, b| b.1.attack.cmp(&a.1.attack));

        for (hand_index, card) in monsters {
            let required = card.def.required_tributes();
            let field = &state.duelist(self.side).field;
            if field.monster_count() < required {
                continue;
            }
            let Some(empty_slot) = field.first_empty_monster_slot() else {
                continue;
            };

            let mut occupied: Vec<(usize, i32)> =
                field.occupied_monsters().map(|(i, c)| (i, c.attack)).collect();
            let tributes: Vec<usize> = if self.difficulty == Difficulty::Easy {
                // Easy tributes whatever comes first
                occupied.iter().take(required).map(|(i, _)| *i).collect()
            } else {
                occupied.sort_by_key(|(_, attack)| *attack);
                occupied.iter().take(required).map(|(i, _)| *i).collect()
            };

            // Prefer defense for walls and weak attackers (normal/hard)
            let set_in_defense = self.difficulty != Difficulty::Easy
                && (card.defense > card.attack + 500 || card.attack < 1200);

            let placed = if set_in_defense {
                state.set_monster(self.side, hand_index, empty_slot)
            } else {
                state.summon(self.side, hand_index, empty_slot, &tributes)
            };
            if placed {
                return true;
            }
        }
        false
    }

    /// Set the first trap in hand when a back-row slot is free
    fn try_set_trap(&self, state: &mut DuelState) -> bool {
        let duelist = state.duelist(self.side);
        let Some(hand_index) = duelist.hand.iter().position(|c| c.def.is_trap()) else {
            return false;
        };
        let Some(slot) = duelist.field.first_empty_spell_trap_slot() else {
            return false;
        };
        state.set_spell_trap(self.side, hand_index, slot)
    }

    /// Attack with every able monster, strongest first, against a live
    /// shrinking list of opposing targets
    pub fn execute_battle_phase(&self, state: &mut DuelState) {
        let defender_side = self.side.other();

        let mut attackers: Vec<(usize, i32)> = state
            .duelist(self.side)
            .field
            .occupied_monsters()
            .filter(|(_, c)| c.position == Position::Attack && !c.cannot_attack && !c.has_attacked)
            .map(|(i, c)| (i, c.attack))
            .collect();
        attackers.sort_by(|a, b| b.1.cmp(&a.1));

        let mut remaining: Vec<usize> = state
            .duelist(defender_side)
            .field
            .occupied_monsters()
            .map(|(i, _)| i)
            .collect();
        let direct_mode = remaining.is_empty();

        for (attacker_slot, _) in attackers {
            // A negation trap may have ended the battle phase mid-loop
            if state.ended || state.turn.phase != Phase::Battle {
                break;
            }
            if direct_mode {
                state.attack(self.side, attacker_slot, None);
                continue;
            }
            let Some(attacker) = state.duelist(self.side).field.monster(attacker_slot).cloned()
            else {
                continue;
            };
            if let Some(target_slot) = self.find_best_target(state, &attacker, &remaining) {
                state.attack(self.side, attacker_slot, Some(target_slot));
                remaining.retain(|&slot| slot != target_slot);
            }
        }
    }

    fn target_infos(&self, state: &DuelState, remaining: &[usize]) -> Vec<TargetInfo> {
        let field = &state.duelist(self.side.other()).field;
        remaining
            .iter()
            .filter_map(|&slot| {
                field.monster(slot).map(|c| TargetInfo {
                    slot,
                    attack: c.attack,
                    defense: c.defense,
                    position: c.position,
                })
            })
            .collect()
    }

    fn find_best_target(
        &self,
        state: &mut DuelState,
        attacker: &CardInstance,
        remaining: &[usize],
    ) -> Option<usize> {
        let targets = self.target_infos(state, remaining);
        match self.difficulty {
            Difficulty::Easy => self.find_easy_target(state, attacker, &targets),
            Difficulty::Normal => self.find_normal_target(state, attacker, &targets),
            Difficulty::Hard => self.find_hard_target(state, attacker, &targets),
        }
    }

    fn killable<'a>(&self, attacker: &CardInstance, targets: &'a [TargetInfo]) -> Vec<&'a TargetInfo> {
        targets
            .iter()
            .filter(|t| match t.position {
                Position::Attack => attacker.attack > t.attack,
                Position::Defense => attacker.attack > t.defense,
            })
            .collect()
    }

    fn decline(&self, state: &DuelState, attacker: &CardInstance) {
        let name = state.duelist_name(self.side);
        state.narrate(
            LogKind::System,
            &format!("{name} decides not to attack with {}", attacker.name()),
        );
    }

    /// Easy: safest kill, else a riskless poke at a defender, else pass
    fn find_easy_target(
        &self,
        state: &DuelState,
        attacker: &CardInstance,
        targets: &[TargetInfo],
    ) -> Option<usize> {
        let killable = self.killable(attacker, targets);
        if let Some(weakest) = killable.iter().min_by_key(|t| t.attack) {
            return Some(weakest.slot);
        }
        if let Some(defender) = targets.iter().find(|t| t.position == Position::Defense) {
            return Some(defender.slot);
        }
        self.decline(state, attacker);
        None
    }

    /// Normal: best kill, else an even trade, else the softest defender
    fn find_normal_target(
        &self,
        state: &DuelState,
        attacker: &CardInstance,
        targets: &[TargetInfo],
    ) -> Option<usize> {
        let killable = self.killable(attacker, targets);
        if let Some(strongest) = killable.iter().max_by_key(|t| t.attack) {
            return Some(strongest.slot);
        }
        if let Some(trade) = targets
            .iter()
            .find(|t| t.position == Position::Attack && t.attack == attacker.attack)
        {
            return Some(trade.slot);
        }
        if let Some(softest) = targets
            .iter()
            .filter(|t| t.position == Position::Defense)
            .min_by_key(|t| t.defense)
        {
            return Some(softest.slot);
        }
        self.decline(state, attacker);
        None
    }

    /// Hard: best kill, else a deliberate sacrifice with a monster that
    /// punishes its destroyer, else the softest defender, else a 30%
    /// chance of a field-opening sacrifice
    fn find_hard_target(
        &self,
        state: &mut DuelState,
        attacker: &CardInstance,
        targets: &[TargetInfo],
    ) -> Option<usize> {
        let killable = self.killable(attacker, targets);
        if let Some(strongest) = killable.iter().max_by_key(|t| t.attack) {
            return Some(strongest.slot);
        }

        let punishes_destroyer = matches!(
            attacker
                .effect_on(EffectTrigger::OnThisCardDestroyed)
                .map(|e| &e.kind),
            Some(EffectKind::WeakenAttacker { .. })
        );
        if punishes_destroyer && targets.len() > 1 {
            if let Some(weakest) = targets.iter().min_by_key(|t| t.attack) {
                let name = state.duelist_name(self.side);
                state.narrate(
                    LogKind::System,
                    &format!("{name} prepares a tactical strike with {}", attacker.name()),
                );
                return Some(weakest.slot);
            }
        }

        if let Some(softest) = targets
            .iter()
            .filter(|t| t.position == Position::Defense)
            .min_by_key(|t| t.defense)
        {
            return Some(softest.slot);
        }

        if state.rng.borrow_mut().gen_bool(0.3) {
            return targets.iter().min_by_key(|t| t.attack).map(|t| t.slot);
        }
        None
    }

    /// Best friendly slot to boost: the one whose boosted attack now beats
    /// the strongest opposing monster it previously lost to. With an empty
    /// opposing field, boost the strongest monster for the direct attack.
    fn find_best_boost_target(&self, state: &DuelState, boost: i32) -> Option<usize> {
        let own = &state.duelist(self.side).field;
        let opposing = &state.duelist(self.side.other()).field;

        let mut best: Option<(usize, i32)> = None;
        for (own_slot, own_monster) in own.occupied_monsters() {
            let best_kill = opposing
                .occupied_monsters()
                .map(|(_, c)| c.attack)
                .filter(|&attack| own_monster.attack < attack && own_monster.attack + boost >= attack)
                .max();
            if let Some(kill_attack) = best_kill {
                if best.map(|(_, a)| kill_attack > a).unwrap_or(true) {
                    best = Some((own_slot, kill_attack));
                }
            }
        }
        if let Some((slot, _)) = best {
            return Some(slot);
        }
        if opposing.monster_count() == 0 {
            return own.strongest_monster_slot();
        }
        None
    }

    /// Halving pays off when our best monster loses to their best but
    /// would win against half of it (ignore already-weak targets)
    fn halving_enables_trade(&self, state: &DuelState) -> bool {
        let strongest_own = state
            .duelist(self.side)
            .field
            .occupied_monsters()
            .map(|(_, c)| c.attack)
            .max();
        let strongest_opposing = state
            .duelist(self.side.other())
            .field
            .occupied_monsters()
            .map(|(_, c)| c.attack)
            .max();
        match (strongest_own, strongest_opposing) {
            (Some(own), Some(opposing)) => {
                opposing > 1000 && own < opposing && own >= opposing / 2
            }
            _ => false,
        }
    }
}
