//! Card definitions and battlefield instances
//!
//! A `CardDefinition` is the immutable catalog record shared by every copy
//! of a card. A `CardInstance` is one copy in play: it carries its own
//! mutable stats and battlefield flags, so changing an instance never
//! affects the definition or any other copy.

use crate::core::{CardEffect, CardName, EffectKind, Tag, TrapTrigger};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

/// The three card categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    Monster,
    Spell,
    Trap,
}

/// Immutable card definition from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub name: CardName,

    pub kind: CardKind,

    /// Base attack (monsters; 0 otherwise)
    pub attack: i32,

    /// Base defense (monsters; 0 otherwise)
    pub defense: i32,

    /// Monster level; drives tribute requirements
    pub level: u8,

    /// Parsed effect, if the card has one
    pub effect: Option<CardEffect>,

    /// Trap response trigger (traps only; `None` for proactive traps)
    pub trap_trigger: Option<TrapTrigger>,

    /// Search tags matched by deck-search effects
    pub tags: SmallVec<[Tag; 2]>,

    /// Original effect text as supplied by the catalog
    pub text: String,
}

impl CardDefinition {
    pub fn is_monster(&self) -> bool {
        self.kind == CardKind::Monster
    }

    pub fn is_spell(&self) -> bool {
        self.kind == CardKind::Spell
    }

    pub fn is_trap(&self) -> bool {
        self.kind == CardKind::Trap
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    /// Tributes required to normal-summon this monster
    /// (level 7+: two, level 5-6: one, below: none)
    pub fn required_tributes(&self) -> usize {
        match self.level {
            l if l >= 7 => 2,
            l if l >= 5 => 1,
            _ => 0,
        }
    }
}

/// Battlefield orientation of a monster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Attack,
    Defense,
}

impl Position {
    pub fn toggled(self) -> Position {
        match self {
            Position::Attack => Position::Defense,
            Position::Defense => Position::Attack,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Attack => "attack",
            Position::Defense => "defense",
        }
    }
}

/// When a temporary stat change is reversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expiry {
    EndOfTurn,
}

/// A reversible stat delta applied to a battlefield instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempEffect {
    pub delta: i32,
    pub expiry: Expiry,
}

/// One copy of a card in play (hand, field, deck, or graveyard)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Shared immutable definition
    pub def: Arc<CardDefinition>,

    /// Current attack (may differ from the base through effects)
    pub attack: i32,

    /// Current defense
    pub defense: i32,

    pub position: Position,

    /// Set spells/traps and set-defense monsters are face down
    pub face_down: bool,

    pub has_attacked: bool,

    /// Cleared when the card is placed; restored at the owner's turn end
    pub can_change_position: bool,

    /// Temporary debuff: this monster may not declare attacks
    pub cannot_attack: bool,

    /// Active temporary stat changes, reversed on expiry
    pub temp_effects: SmallVec<[TempEffect; 2]>,
}

impl CardInstance {
    pub fn new(def: Arc<CardDefinition>) -> Self {
        let attack = def.attack;
        let defense = def.defense;
        CardInstance {
            def,
            attack,
            defense,
            position: Position::Attack,
            face_down: false,
            has_attacked: false,
            can_change_position: false,
            cannot_attack: false,
            temp_effects: SmallVec::new(),
        }
    }

    pub fn name(&self) -> &CardName {
        &self.def.name
    }

    pub fn kind(&self) -> CardKind {
        self.def.kind
    }

    pub fn is_monster(&self) -> bool {
        self.def.is_monster()
    }

    pub fn level(&self) -> u8 {
        self.def.level
    }

    pub fn effect(&self) -> Option<&CardEffect> {
        self.def.effect.as_ref()
    }

    /// Does this card's effect match the given trigger?
    pub fn effect_on(&self, trigger: crate::core::EffectTrigger) -> Option<&CardEffect> {
        self.def
            .effect
            .as_ref()
            .filter(|effect| effect.trigger == trigger)
    }

    pub fn has_piercing(&self) -> bool {
        matches!(
            self.def.effect,
            Some(CardEffect {
                kind: EffectKind::Piercing,
                ..
            })
        )
    }

    /// Attack with all temporary deltas removed (the card's "own" strength,
    /// used for match statistics)
    pub fn attack_without_temp(&self) -> i32 {
        let temp: i32 = self.temp_effects.iter().map(|e| e.delta).sum();
        self.attack - temp
    }

    /// Apply a temporary attack boost that expires at end of turn
    pub fn apply_temp_boost(&mut self, amount: i32) {
        self.attack += amount;
        self.temp_effects.push(TempEffect {
            delta: amount,
            expiry: Expiry::EndOfTurn,
        });
    }

    /// Reverse and drop all end-of-turn effects; returns the total reversed
    /// delta (0 when nothing expired)
    pub fn expire_end_of_turn_effects(&mut self) -> i32 {
        let mut reversed = 0;
        self.temp_effects.retain(|effect| match effect.expiry {
            Expiry::EndOfTurn => {
                reversed += effect.delta;
                false
            }
        });
        self.attack -= reversed;
        reversed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EffectTrigger;

    fn monster_def(name: &str, attack: i32, defense: i32, level: u8) -> Arc<CardDefinition> {
        Arc::new(CardDefinition {
            name: CardName::new(name),
            kind: CardKind::Monster,
            attack,
            defense,
            level,
            effect: None,
            trap_trigger: None,
            tags: SmallVec::new(),
            text: String::new(),
        })
    }

    #[test]
    fn test_required_tributes() {
        assert_eq!(monster_def("a", 1000, 1000, 4).required_tributes(), 0);
        assert_eq!(monster_def("b", 2000, 1500, 5).required_tributes(), 1);
        assert_eq!(monster_def("c", 2400, 2000, 6).required_tributes(), 1);
        assert_eq!(monster_def("d", 2600, 2100, 7).required_tributes(), 2);
        assert_eq!(monster_def("e", 3000, 2500, 8).required_tributes(), 2);
    }

    #[test]
    fn test_instance_is_a_value_copy() {
        let def = monster_def("Data Golem", 1800, 1600, 5);
        let mut a = CardInstance::new(def.clone());
        let b = CardInstance::new(def.clone());

        a.attack += 500;
        assert_eq!(a.attack, 2300);
        assert_eq!(b.attack, 1800);
        assert_eq!(def.attack, 1800);
    }

    #[test]
    fn test_temp_boost_expiry() {
        let mut card = CardInstance::new(monster_def("Core Warden", 1400, 1200, 3));
        card.apply_temp_boost(1000);
        assert_eq!(card.attack, 2400);
        assert_eq!(card.attack_without_temp(), 1400);

        let reversed = card.expire_end_of_turn_effects();
        assert_eq!(reversed, 1000);
        assert_eq!(card.attack, 1400);
        assert!(card.temp_effects.is_empty());
    }

    #[test]
    fn test_effect_trigger_match() {
        let def = Arc::new(CardDefinition {
            name: CardName::new("Static Banshee"),
            kind: CardKind::Monster,
            attack: 1100,
            defense: 700,
            level: 3,
            effect: Some(CardEffect {
                trigger: EffectTrigger::OnThisCardDestroyed,
                kind: EffectKind::WeakenAttacker { amount: 800 },
            }),
            trap_trigger: None,
            tags: SmallVec::new(),
            text: String::new(),
        });
        let card = CardInstance::new(def);

        assert!(card.effect_on(EffectTrigger::OnThisCardDestroyed).is_some());
        assert!(card.effect_on(EffectTrigger::OnSummon).is_none());
    }
}
