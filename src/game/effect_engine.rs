//! Effect resolution engine
//!
//! Resolves typed card effects against the duel state: activation,
//! reactive triggers (on-summon, on-destroyed, sent-to-graveyard), trap
//! responses, and end-of-turn expiry. Effects with no eligible target
//! no-op with a narration line; the activation cost has already been paid
//! by then and stays paid.

use crate::core::{CardInstance, EffectKind, EffectTrigger, Tag, TrapTrigger};
use crate::game::cues::PresentationCue;
use crate::game::logger::LogKind;
use crate::game::phase::{Phase, Side};
use crate::game::state::DuelState;
use crate::game::targeting::{SpellOrigin, TargetAction, TargetingState};
use crate::core::Position;
use crate::zones::{FieldZone, FIELD_SLOTS};
use serde::{Deserialize, Serialize};

/// A monster's place on the board, used to hand an effect its subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLocation {
    pub side: Side,
    pub slot: usize,
}

/// Extra parameters flowing into an effect resolution
#[derive(Debug, Clone, Copy, Default)]
pub struct EffectContext {
    /// Chosen or implied target slot on the owner's field
    pub target_slot: Option<usize>,
    /// The monster whose attack triggered this resolution, if any
    pub attacker: Option<CardLocation>,
}

impl EffectContext {
    pub fn on_slot(slot: usize) -> Self {
        EffectContext {
            target_slot: Some(slot),
            attacker: None,
        }
    }

    pub fn with_attacker(location: CardLocation) -> Self {
        EffectContext {
            target_slot: None,
            attacker: Some(location),
        }
    }
}

impl DuelState {
    /// Resolve a card's effect for its owner. `card` is a snapshot of the
    /// resolving card; the cost (discard, reveal) has already been handled
    /// by the caller.
    pub fn resolve_effect(&mut self, card: &CardInstance, owner: Side, ctx: EffectContext) {
        if self.ended {
            return;
        }
        let owner_name = self.duelist_name(owner);
        self.narrate(
            LogKind::Effect,
            &format!("{owner_name} activates {}", card.name()),
        );

        let Some(effect) = card.effect() else {
            self.narrate(
                LogKind::Warning,
                &format!("no effect handler for {}", card.name()),
            );
            return;
        };

        match effect.kind.clone() {
            // The battle resolver reads the marker directly
            EffectKind::Piercing => {}
            EffectKind::Negate => {
                self.narrate(LogKind::Effect, "The action was negated");
            }
            EffectKind::SearchByTag { tag } => self.effect_search_by_tag(owner, &tag, false),
            EffectKind::SearchByTagOrDraw { tag } => self.effect_search_by_tag(owner, &tag, true),
            EffectKind::WeakenStrongest { amount } => {
                self.effect_weaken_strongest(owner.other(), amount)
            }
            EffectKind::NegateAttackEndBattle => {
                self.turn.phase = Phase::Main2;
                self.narrate(
                    LogKind::Effect,
                    "The attack was negated and the battle phase is over",
                );
            }
            EffectKind::DrawCards { count } => {
                for _ in 0..count {
                    self.draw_for(owner);
                }
            }
            EffectKind::ReviveWeakest => self.effect_revive(owner),
            EffectKind::BoostTarget { amount } => self.effect_boost(owner, amount, ctx.target_slot),
            EffectKind::HalveStrongestAtk => self.effect_halve_strongest(owner.other()),
            EffectKind::StealStrongest => self.effect_steal_strongest(owner),
            EffectKind::ResetHands { redraw } => self.effect_reset_hands(redraw),
            EffectKind::RecoverStrongestFromGraveyard => self.effect_recover_from_graveyard(owner),
            EffectKind::DisableNewestAttacker => self.effect_disable_newest(owner.other()),
            EffectKind::TributeSummonBonus { amount } => {
                self.effect_tribute_bonus(owner, amount, ctx.target_slot)
            }
            EffectKind::DestroyAllSpellTraps => self.effect_destroy_all_spell_traps(),
            EffectKind::WeakenAttacker { amount } => {
                self.effect_weaken_attacker(ctx.attacker, amount)
            }
        }
    }

    /// Resolve a card's effect only when it declares the given trigger
    pub fn check_reactive_effect(
        &mut self,
        card: &CardInstance,
        trigger: EffectTrigger,
        owner: Side,
        ctx: EffectContext,
    ) {
        if card.effect_on(trigger).is_some() {
            self.resolve_effect(card, owner, ctx);
        }
    }

    /// Scan the non-active duelist's face-down traps for one answering the
    /// trigger. The first match is revealed, resolved against the acting
    /// duelist, and discarded. Returns whether a response occurred; the
    /// caller must then abort or alter the pending action.
    pub fn check_trap_response(&mut self, trigger: TrapTrigger, ctx: EffectContext) -> bool {
        if self.ended {
            return false;
        }
        let responder = self.turn.active.other();
        let found = self
            .duelist(responder)
            .field
            .occupied_spell_traps()
            .find(|(_, c)| {
                c.face_down && c.def.is_trap() && c.def.trap_trigger == Some(trigger)
            })
            .map(|(slot, _)| slot);
        let Some(slot) = found else {
            return false;
        };

        let Some(mut card) = self.duelist_mut(responder).field.take_spell_trap(slot) else {
            return false;
        };
        card.face_down = false;
        let name = self.duelist_name(responder);
        self.narrate(LogKind::Effect, &format!("{name} reveals {}", card.name()));
        self.resolve_effect(&card, responder, ctx);
        self.duelist_mut(responder).graveyard.add(card);
        self.cues.push(PresentationCue::Refresh);
        true
    }

    /// Activate a spell from the hand or flip a set card on the field.
    /// Manual-target spells enter the pending-target sub-state instead of
    /// resolving immediately.
    pub fn activate_spell_trap(&mut self, side: Side, origin: SpellOrigin) -> bool {
        if self.ended || self.turn.active != side {
            return false;
        }
        if self.targeting.is_pending() {
            return self.reject("choose a target for the pending effect first");
        }

        let card = match origin {
            SpellOrigin::Hand { index } => self.duelist(side).hand.get(index).cloned(),
            SpellOrigin::Field { slot } => self.duelist(side).field.spell_trap(slot).cloned(),
        };
        let Some(card) = card else {
            return self.reject("no card there to activate");
        };
        if card.is_monster() {
            return self.reject(&format!("{} is not a spell or trap", card.name()));
        }
        if matches!(origin, SpellOrigin::Hand { .. }) {
            if card.def.is_trap() {
                return self.reject(&format!("{} must be set before it can be used", card.name()));
            }
            if !self.turn.phase.is_main() {
                return self.reject("spells can only be played in a main phase");
            }
        }

        if let Some(EffectKind::BoostTarget { amount }) = card.effect().map(|e| &e.kind) {
            self.targeting = TargetingState::AwaitingTarget {
                side,
                origin,
                action: TargetAction::BoostMonster { amount: *amount },
            };
            self.narrate(
                LogKind::System,
                &format!("Activating {}. Choose one of your monsters.", card.name()),
            );
            return true;
        }

        let Some(card) = self.pay_spell_cost(side, origin) else {
            return false;
        };
        self.selected_hand_card = None;
        self.resolve_effect(&card, side, EffectContext::default());
        self.cues.push(PresentationCue::Refresh);
        true
    }

    /// Advance the pending-target sub-state with a chosen slot. A valid
    /// target pays the cost and applies the effect; an invalid one cancels.
    pub fn select_target(&mut self, slot: usize) -> bool {
        let TargetingState::AwaitingTarget {
            side,
            origin,
            action,
        } = self.targeting
        else {
            return self.reject("no effect is waiting for a target");
        };
        self.targeting = TargetingState::Idle;
        self.selected_hand_card = None;

        if self.duelist(side).field.monster(slot).is_none() {
            return self.reject("Invalid target. The action was cancelled.");
        }
        let Some(card) = self.pay_spell_cost(side, origin) else {
            return self.reject("the activated card is no longer there");
        };

        // A face-down counter-trap may answer the targeted spell; the cost
        // stays paid either way.
        if self.check_trap_response(TrapTrigger::SpellTarget, EffectContext::default()) {
            self.narrate(LogKind::System, &format!("{} was negated", card.name()));
            self.cues.push(PresentationCue::Refresh);
            return true;
        }

        match action {
            TargetAction::BoostMonster { .. } => {
                self.resolve_effect(&card, side, EffectContext::on_slot(slot));
            }
        }
        self.cues.push(PresentationCue::Refresh);
        true
    }

    /// Move the activated card to the graveyard, returning a snapshot of it
    pub(crate) fn pay_spell_cost(
        &mut self,
        side: Side,
        origin: SpellOrigin,
    ) -> Option<CardInstance> {
        let duelist = self.duelist_mut(side);
        let mut card = match origin {
            SpellOrigin::Hand { index } => {
                if index < duelist.hand.len() {
                    Some(duelist.hand.remove(index))
                } else {
                    None
                }
            }
            SpellOrigin::Field { slot } => duelist.field.take_spell_trap(slot),
        }?;
        card.face_down = false;
        duelist.graveyard.add(card.clone());
        Some(card)
    }

    /// Reverse and drop every end-of-turn stat change on a duelist's field
    pub fn process_end_of_turn_effects(&mut self, side: Side) {
        let mut expired = Vec::new();
        {
            let duelist = self.duelist_mut(side);
            for slot in duelist.field.monsters.iter_mut().flatten() {
                if slot.expire_end_of_turn_effects() != 0 {
                    expired.push(slot.name().to_string());
                }
            }
        }
        for name in expired {
            self.narrate(
                LogKind::System,
                &format!("The attack bonus on {name} wore off"),
            );
        }
    }

    // --- individual effect behaviors ---

    fn effect_search_by_tag(&mut self, owner: Side, tag: &Tag, fallback_draw: bool) {
        let owner_name = self.duelist_name(owner);
        let found = {
            let duelist = self.duelist_mut(owner);
            duelist
                .deck
                .take_first(|c| c.def.has_tag(tag))
                .map(|card| {
                    let name = card.name().to_string();
                    duelist.hand.push(card);
                    name
                })
        };
        match found {
            Some(name) => self.narrate(
                LogKind::Effect,
                &format!("{owner_name} adds {name} to their hand"),
            ),
            None if fallback_draw => {
                self.narrate(
                    LogKind::System,
                    &format!("No '{tag}' card found. {owner_name} draws 1 card instead."),
                );
                self.draw_for(owner);
            }
            None => self.narrate(
                LogKind::System,
                &format!("No '{tag}' card in {owner_name}'s deck"),
            ),
        }
    }

    fn effect_weaken_strongest(&mut self, target_side: Side, amount: i32) {
        let weakened = {
            let duelist = self.duelist_mut(target_side);
            duelist
                .field
                .strongest_monster_slot()
                .and_then(|slot| duelist.field.monster_mut(slot))
                .map(|monster| {
                    monster.attack -= amount;
                    monster.name().to_string()
                })
        };
        match weakened {
            Some(name) => self.narrate(
                LogKind::Effect,
                &format!("{name}'s attack drops by {amount}"),
            ),
            None => self.narrate(LogKind::System, "No monster to weaken"),
        }
    }

    fn effect_halve_strongest(&mut self, target_side: Side) {
        let halved = {
            let duelist = self.duelist_mut(target_side);
            duelist
                .field
                .strongest_monster_slot()
                .and_then(|slot| duelist.field.monster_mut(slot))
                .map(|monster| {
                    monster.attack /= 2;
                    monster.name().to_string()
                })
        };
        match halved {
            Some(name) => self.narrate(LogKind::Effect, &format!("{name}'s attack was halved!")),
            None => self.narrate(LogKind::System, "No monster to weaken"),
        }
    }

    fn effect_revive(&mut self, owner: Side) {
        let has_target = self
            .duelist(owner)
            .graveyard
            .iter()
            .any(|c| c.is_monster() && c.level() <= 4);
        let empty_slot = self.duelist(owner).field.first_empty_monster_slot();
        let Some(slot) = empty_slot.filter(|_| has_target) else {
            self.narrate(LogKind::System, "No monster could be revived");
            return;
        };
        if self.check_trap_response(TrapTrigger::SpecialSummon, EffectContext::default()) {
            return;
        }

        let owner_name = self.duelist_name(owner);
        let revived = {
            let duelist = self.duelist_mut(owner);
            duelist
                .graveyard
                .take_strongest(|c| c.is_monster() && c.level() <= 4)
                .map(|mut card| {
                    card.position = Position::Defense;
                    card.face_down = false;
                    card.has_attacked = false;
                    card.cannot_attack = false;
                    card.can_change_position = false;
                    let name = card.name().to_string();
                    duelist.field.monsters[slot] = Some(card);
                    name
                })
        };
        if let Some(name) = revived {
            self.narrate(
                LogKind::Effect,
                &format!("{owner_name} revives {name} in defense position"),
            );
        }
    }

    fn effect_boost(&mut self, owner: Side, amount: i32, target_slot: Option<usize>) {
        let boosted = target_slot.and_then(|slot| {
            self.duelist_mut(owner)
                .field
                .monster_mut(slot)
                .map(|monster| {
                    monster.apply_temp_boost(amount);
                    monster.name().to_string()
                })
        });
        match boosted {
            Some(name) => self.narrate(
                LogKind::Effect,
                &format!("{name} gains {amount} attack until end of turn"),
            ),
            None => self.narrate(LogKind::System, "No monster to strengthen"),
        }
    }

    fn effect_steal_strongest(&mut self, owner: Side) {
        let owner_name = self.duelist_name(owner);
        let stolen = {
            let (own, opp) = self.pair_mut(owner);
            match (
                opp.field.strongest_monster_slot(),
                own.field.first_empty_monster_slot(),
            ) {
                (Some(target), Some(empty)) => opp.field.take_monster(target).map(|card| {
                    let name = card.name().to_string();
                    own.field.monsters[empty] = Some(card);
                    name
                }),
                _ => None,
            }
        };
        match stolen {
            Some(name) => self.narrate(
                LogKind::Effect,
                &format!("{owner_name} takes control of {name}!"),
            ),
            None => self.narrate(LogKind::System, "No monster to take control of"),
        }
    }

    fn effect_reset_hands(&mut self, redraw: u8) {
        for side in [Side::Player, Side::Opponent] {
            {
                let duelist = self.duelist_mut(side);
                let hand = std::mem::take(&mut duelist.hand);
                for card in hand {
                    duelist.graveyard.add(card);
                }
            }
            for _ in 0..redraw {
                self.draw_for(side);
            }
        }
        self.narrate(
            LogKind::Effect,
            &format!("Both duelists discard their hands and draw {redraw} new cards"),
        );
    }

    fn effect_recover_from_graveyard(&mut self, owner: Side) {
        let owner_name = self.duelist_name(owner);
        let recovered = {
            let duelist = self.duelist_mut(owner);
            duelist
                .graveyard
                .take_strongest(|c| c.is_monster())
                .map(|card| {
                    let name = card.name().to_string();
                    duelist.hand.push(card);
                    name
                })
        };
        match recovered {
            Some(name) => self.narrate(
                LogKind::Effect,
                &format!("{owner_name} recovers {name} from the graveyard"),
            ),
            None => self.narrate(LogKind::System, "No monster in the graveyard to recover"),
        }
    }

    fn effect_disable_newest(&mut self, target_side: Side) {
        let disabled = {
            let duelist = self.duelist_mut(target_side);
            duelist
                .field
                .newest_monster_slot()
                .and_then(|slot| duelist.field.monster_mut(slot))
                .map(|monster| {
                    monster.cannot_attack = true;
                    monster.name().to_string()
                })
        };
        match disabled {
            Some(name) => self.narrate(
                LogKind::Effect,
                &format!("{name} is prevented from attacking"),
            ),
            None => self.narrate(LogKind::System, "No monster to disable"),
        }
    }

    fn effect_tribute_bonus(&mut self, owner: Side, amount: i32, target_slot: Option<usize>) {
        let boosted = target_slot.and_then(|slot| {
            self.duelist_mut(owner)
                .field
                .monster_mut(slot)
                .filter(|monster| monster.level() >= 5)
                .map(|monster| {
                    monster.attack += amount;
                    monster.name().to_string()
                })
        });
        if let Some(name) = boosted {
            self.narrate(
                LogKind::Effect,
                &format!("{name} gains {amount} attack from the tribute"),
            );
        }
    }

    fn effect_destroy_all_spell_traps(&mut self) {
        for side in [Side::Player, Side::Opponent] {
            let mut destroyed = Vec::new();
            {
                let duelist = self.duelist_mut(side);
                for slot in 0..FIELD_SLOTS {
                    if let Some(card) = duelist.field.take_spell_trap(slot) {
                        let name = card.name().to_string();
                        duelist.graveyard.add(card);
                        destroyed.push((slot, name));
                    }
                }
            }
            for (slot, name) in destroyed {
                self.cues.push(PresentationCue::Destruction {
                    side,
                    zone: FieldZone::SpellTraps,
                    slot,
                });
                self.narrate(LogKind::Destruction, &format!("{name} was destroyed"));
            }
        }
    }

    fn effect_weaken_attacker(&mut self, attacker: Option<CardLocation>, amount: i32) {
        let weakened = attacker.and_then(|location| {
            self.duelist_mut(location.side)
                .field
                .monster_mut(location.slot)
                .map(|monster| {
                    monster.attack -= amount;
                    monster.name().to_string()
                })
        });
        match weakened {
            Some(name) => self.narrate(
                LogKind::Effect,
                &format!("{name}'s attack falls by {amount}!"),
            ),
            None => self.narrate(LogKind::System, "No attacking monster to weaken"),
        }
    }
}
