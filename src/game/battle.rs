//! Battle resolution
//!
//! Combat math between an attacker and an optional defender, including
//! mutual destruction and piercing. Destruction always routes through one
//! shared path: fire the reactive trigger while the card is still on the
//! field, then move it to its owner's graveyard.

use crate::core::{EffectTrigger, Position, TrapTrigger};
use crate::game::cues::PresentationCue;
use crate::game::effect_engine::{CardLocation, EffectContext};
use crate::game::logger::LogKind;
use crate::game::phase::{Phase, Side};
use crate::game::state::DuelState;
use crate::zones::FieldZone;

impl DuelState {
    /// Declare an attack. Validates phase/turn/attacker/target, marks the
    /// attacker, gives face-down traps their response window, and resolves
    /// the battle unless a trap aborted it.
    ///
    /// The resolution lock rejects a second attack while one is in flight;
    /// every attack runs to completion before this method returns.
    pub fn attack(&mut self, side: Side, attacker_slot: usize, target_slot: Option<usize>) -> bool {
        if self.ended || self.resolving_attack {
            return false;
        }
        if self.turn.active != side {
            return self.reject("it is not your turn");
        }
        if self.turn.phase != Phase::Battle {
            return self.reject("attacks are only possible in the battle phase");
        }
        if self.targeting.is_pending() {
            return self.reject("choose a target for the pending effect first");
        }

        let defender_side = side.other();
        let Some(attacker) = self.duelist(side).field.monster(attacker_slot) else {
            return self.reject("no monster in that zone");
        };
        if attacker.position != Position::Attack {
            return self.reject(&format!("{} is not in attack position", attacker.name()));
        }
        if attacker.has_attacked {
            return self.reject(&format!("{} has already attacked", attacker.name()));
        }
        if attacker.cannot_attack {
            return self.reject(&format!("{} cannot attack", attacker.name()));
        }
        let attacker_name = attacker.name().to_string();

        let target_desc = match target_slot {
            Some(slot) => match self.duelist(defender_side).field.monster(slot) {
                Some(target) => target.name().to_string(),
                None => return self.reject("no monster to attack in that zone"),
            },
            None => "directly".to_string(),
        };

        self.resolving_attack = true;
        if let Some(monster) = self.duelist_mut(side).field.monster_mut(attacker_slot) {
            monster.has_attacked = true;
        }

        let name = self.duelist_name(side);
        self.narrate(
            LogKind::Attack,
            &format!("{name} attacks {target_desc} with {attacker_name}"),
        );
        self.cues.push(PresentationCue::Attack {
            side,
            attacker_slot,
            target_slot,
        });

        let trigger = if target_slot.is_none() {
            TrapTrigger::DirectAttackDeclaration
        } else {
            TrapTrigger::AttackDeclaration
        };
        let ctx = EffectContext::with_attacker(CardLocation {
            side,
            slot: attacker_slot,
        });
        if !self.check_trap_response(trigger, ctx) {
            self.resolve_battle(side, attacker_slot, target_slot);
        }

        self.cues.push(PresentationCue::Refresh);
        self.resolving_attack = false;
        true
    }

    /// Apply combat math for an attack already declared and not trapped
    pub(crate) fn resolve_battle(
        &mut self,
        attacker_side: Side,
        attacker_slot: usize,
        target_slot: Option<usize>,
    ) {
        if self.ended {
            return;
        }
        let defender_side = attacker_side.other();

        let Some(target_slot) = target_slot else {
            // Direct attack
            let attack = self
                .duelist(attacker_side)
                .field
                .monster(attacker_slot)
                .map(|c| c.attack)
                .unwrap_or(0);
            self.apply_damage(defender_side, attack, "Direct attack!");
            self.check_duel_end();
            return;
        };

        let Some(attacker) = self.duelist(attacker_side).field.monster(attacker_slot).cloned()
        else {
            return;
        };
        let Some(target) = self.duelist(defender_side).field.monster(target_slot).cloned() else {
            return;
        };

        match target.position {
            Position::Attack => {
                if attacker.attack > target.attack {
                    let damage = attacker.attack - target.attack;
                    self.apply_damage(defender_side, damage, "");
                    self.destroy_monster(
                        defender_side,
                        target_slot,
                        EffectTrigger::OnSentToGraveyard,
                        Some(CardLocation {
                            side: attacker_side,
                            slot: attacker_slot,
                        }),
                    );
                } else if attacker.attack < target.attack {
                    let damage = target.attack - attacker.attack;
                    self.apply_damage(attacker_side, damage, "");
                    self.destroy_monster(
                        attacker_side,
                        attacker_slot,
                        EffectTrigger::OnThisCardDestroyed,
                        Some(CardLocation {
                            side: defender_side,
                            slot: target_slot,
                        }),
                    );
                } else {
                    // Equal attacks: both destroyed, no damage either way.
                    // Both destruction triggers resolve while both cards are
                    // still on the field, then both move together.
                    self.narrate(
                        LogKind::Destruction,
                        &format!("{} and {} destroy each other", attacker.name(), target.name()),
                    );
                    self.cues.push(PresentationCue::Destruction {
                        side: attacker_side,
                        zone: FieldZone::Monsters,
                        slot: attacker_slot,
                    });
                    self.cues.push(PresentationCue::Destruction {
                        side: defender_side,
                        zone: FieldZone::Monsters,
                        slot: target_slot,
                    });

                    self.check_reactive_effect(
                        &attacker,
                        EffectTrigger::OnThisCardDestroyed,
                        attacker_side,
                        EffectContext::with_attacker(CardLocation {
                            side: defender_side,
                            slot: target_slot,
                        }),
                    );
                    self.check_reactive_effect(
                        &target,
                        EffectTrigger::OnSentToGraveyard,
                        defender_side,
                        EffectContext::with_attacker(CardLocation {
                            side: attacker_side,
                            slot: attacker_slot,
                        }),
                    );

                    let (attacking, defending) = self.pair_mut(attacker_side);
                    if let Some(card) = attacking.field.take_monster(attacker_slot) {
                        attacking.graveyard.add(card);
                    }
                    if let Some(card) = defending.field.take_monster(target_slot) {
                        defending.graveyard.add(card);
                    }
                }
            }
            Position::Defense => {
                if attacker.attack > target.defense {
                    self.destroy_monster(
                        defender_side,
                        target_slot,
                        EffectTrigger::OnSentToGraveyard,
                        Some(CardLocation {
                            side: attacker_side,
                            slot: attacker_slot,
                        }),
                    );
                    if attacker.has_piercing() {
                        let piercing = attacker.attack - target.defense;
                        self.apply_damage(defender_side, piercing, "Piercing damage!");
                    }
                } else if attacker.attack < target.defense {
                    let damage = target.defense - attacker.attack;
                    self.apply_damage(attacker_side, damage, "The defense held.");
                }
                // Equal attack and defense: nothing happens either way
            }
        }
        self.check_duel_end();
    }

    /// Shared destruction path: narrate, cue, fire the reactive trigger
    /// while the card is still on the field, then move it to the graveyard.
    pub(crate) fn destroy_monster(
        &mut self,
        side: Side,
        slot: usize,
        trigger: EffectTrigger,
        attacker: Option<CardLocation>,
    ) {
        let Some(card) = self.duelist(side).field.monster(slot).cloned() else {
            return;
        };
        self.narrate(
            LogKind::Destruction,
            &format!("{} was destroyed", card.name()),
        );
        self.cues.push(PresentationCue::Destruction {
            side,
            zone: FieldZone::Monsters,
            slot,
        });

        self.check_reactive_effect(
            &card,
            trigger,
            side,
            EffectContext {
                target_slot: None,
                attacker,
            },
        );

        let duelist = self.duelist_mut(side);
        if let Some(card) = duelist.field.take_monster(slot) {
            duelist.graveyard.add(card);
        }
    }
}
