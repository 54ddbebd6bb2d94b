//! Duelist state and its narrow mutators
//!
//! A `Duelist` owns its life points, zones, and per-turn flags. The mutators
//! here validate everything before touching state: a failed operation
//! returns `DuelError::IllegalAction` and changes nothing. The action
//! surface above turns those errors into user-facing log lines.

use crate::core::{CardInstance, DuelistName, Position};
use crate::zones::{CardPile, Field};
use crate::{DuelError, Result};
use serde::{Deserialize, Serialize};

/// Starting life points for both duelists
pub const STARTING_LIFE_POINTS: i32 = 8000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Duelist {
    pub name: DuelistName,

    /// Never negative; 0 means this duelist has lost
    pub life_points: i32,

    pub deck: CardPile,

    pub hand: Vec<CardInstance>,

    pub graveyard: CardPile,

    pub field: Field,

    /// One normal summon (or set) per turn; reset at this duelist's turn end
    pub has_normal_summoned: bool,

    /// Tutorial mode lifts the normal-summon limit
    pub summon_limit_bypassed: bool,

    /// Latched when a draw was attempted on an empty deck.
    /// Known gap carried over from the original rules: running out of cards
    /// does not lose the duel, it only skips the draw.
    pub deck_out: bool,
}

impl Duelist {
    pub fn new(name: impl Into<DuelistName>) -> Self {
        Duelist {
            name: name.into(),
            life_points: STARTING_LIFE_POINTS,
            deck: CardPile::new(),
            hand: Vec::new(),
            graveyard: CardPile::new(),
            field: Field::new(),
            has_normal_summoned: false,
            summon_limit_bypassed: false,
            deck_out: false,
        }
    }

    /// Move the top deck card into the hand. Returns whether a card was
    /// drawn; an empty deck flags `deck_out` and leaves the hand unchanged.
    pub fn draw_card(&mut self) -> bool {
        match self.deck.draw_top() {
            Some(card) => {
                self.hand.push(card);
                true
            }
            None => {
                self.deck_out = true;
                false
            }
        }
    }

    /// Draw the five-card opening hand
    pub fn draw_initial_hand(&mut self) {
        for _ in 0..5 {
            self.draw_card();
        }
    }

    fn check_normal_summon_available(&self) -> Result<()> {
        if self.has_normal_summoned && !self.summon_limit_bypassed {
            return Err(DuelError::IllegalAction(
                "normal summon already used this turn".to_string(),
            ));
        }
        Ok(())
    }

    fn hand_monster(&self, hand_index: usize) -> Result<&CardInstance> {
        let card = self.hand.get(hand_index).ok_or_else(|| {
            DuelError::IllegalAction(format!("no card at hand index {hand_index}"))
        })?;
        if !card.is_monster() {
            return Err(DuelError::IllegalAction(format!(
                "{} is not a monster",
                card.name()
            )));
        }
        Ok(card)
    }

    /// Normal-summon a monster from the hand, paying tributes from the
    /// field. The destination slot must be empty or freed by a tribute.
    ///
    /// Consumes the per-turn normal summon. Returns the slot the monster
    /// landed on.
    pub fn summon_monster(
        &mut self,
        hand_index: usize,
        field_slot: usize,
        tributes: &[usize],
    ) -> Result<usize> {
        self.check_normal_summon_available()?;
        let card = self.hand_monster(hand_index)?;

        let required = card.def.required_tributes();
        if tributes.len() < required {
            return Err(DuelError::IllegalAction(format!(
                "{} tribute(s) required to summon {}",
                required,
                card.name()
            )));
        }

        if field_slot >= crate::zones::FIELD_SLOTS {
            return Err(DuelError::IllegalAction(format!(
                "no monster zone {field_slot}"
            )));
        }
        for (i, &slot) in tributes.iter().enumerate() {
            if self.field.monster(slot).is_none() {
                return Err(DuelError::IllegalAction(format!(
                    "tribute slot {slot} is empty"
                )));
            }
            if tributes[..i].contains(&slot) {
                return Err(DuelError::IllegalAction(format!(
                    "tribute slot {slot} named twice"
                )));
            }
        }
        if self.field.monster(field_slot).is_some() && !tributes.contains(&field_slot) {
            return Err(DuelError::IllegalAction(format!(
                "monster zone {field_slot} is occupied"
            )));
        }

        for &slot in tributes {
            if let Some(tribute) = self.field.take_monster(slot) {
                self.graveyard.add(tribute);
            }
        }

        let mut monster = self.hand.remove(hand_index);
        monster.position = Position::Attack;
        monster.face_down = false;
        monster.has_attacked = false;
        monster.can_change_position = false;
        monster.cannot_attack = false;
        self.field.monsters[field_slot] = Some(monster);
        self.has_normal_summoned = true;
        Ok(field_slot)
    }

    /// Set a monster from the hand face-down in defense position.
    /// Counts as the turn's normal summon.
    pub fn set_monster(&mut self, hand_index: usize, field_slot: usize) -> Result<usize> {
        self.check_normal_summon_available()?;
        self.hand_monster(hand_index)?;

        if field_slot >= crate::zones::FIELD_SLOTS {
            return Err(DuelError::IllegalAction(format!(
                "no monster zone {field_slot}"
            )));
        }
        if self.field.monster(field_slot).is_some() {
            return Err(DuelError::IllegalAction(format!(
                "monster zone {field_slot} is occupied"
            )));
        }

        let mut monster = self.hand.remove(hand_index);
        monster.position = Position::Defense;
        monster.face_down = true;
        monster.has_attacked = false;
        monster.can_change_position = false;
        monster.cannot_attack = false;
        self.field.monsters[field_slot] = Some(monster);
        self.has_normal_summoned = true;
        Ok(field_slot)
    }

    /// Set a spell or trap face-down in an empty back-row slot.
    /// Does not consume the normal summon.
    pub fn set_spell_trap(&mut self, hand_index: usize, field_slot: usize) -> Result<usize> {
        let card = self.hand.get(hand_index).ok_or_else(|| {
            DuelError::IllegalAction(format!("no card at hand index {hand_index}"))
        })?;
        if card.is_monster() {
            return Err(DuelError::IllegalAction(format!(
                "{} is not a spell or trap",
                card.name()
            )));
        }
        if field_slot >= crate::zones::FIELD_SLOTS {
            return Err(DuelError::IllegalAction(format!(
                "no spell/trap zone {field_slot}"
            )));
        }
        if self.field.spell_trap(field_slot).is_some() {
            return Err(DuelError::IllegalAction(format!(
                "spell/trap zone {field_slot} is occupied"
            )));
        }

        let mut card = self.hand.remove(hand_index);
        card.face_down = true;
        self.field.spell_traps[field_slot] = Some(card);
        Ok(field_slot)
    }

    /// Toggle a monster between attack and defense position. Allowed once
    /// per turn and never in the turn the monster was placed.
    pub fn change_monster_position(&mut self, field_slot: usize) -> Result<Position> {
        let monster = self.field.monster_mut(field_slot).ok_or_else(|| {
            DuelError::IllegalAction(format!("no monster in zone {field_slot}"))
        })?;
        if !monster.can_change_position {
            return Err(DuelError::IllegalAction(format!(
                "{} cannot change position this turn",
                monster.name()
            )));
        }
        monster.position = monster.position.toggled();
        monster.face_down = false;
        monster.can_change_position = false;
        Ok(monster.position)
    }

    /// Subtract life points, clamping at zero
    pub fn take_damage(&mut self, amount: i32) {
        self.life_points = (self.life_points - amount).max(0);
    }

    pub fn has_lost(&self) -> bool {
        self.life_points <= 0
    }

    /// Turn-end housekeeping: monsters may attack and change position again
    pub fn reset_turn_flags(&mut self) {
        for monster in self.field.monsters.iter_mut().flatten() {
            monster.has_attacked = false;
            monster.cannot_attack = false;
            monster.can_change_position = true;
        }
        self.has_normal_summoned = false;
    }
}
