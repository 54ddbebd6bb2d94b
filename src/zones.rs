//! Card zones: ordered piles (deck, graveyard) and the fixed-slot field

use crate::core::CardInstance;
use serde::{Deserialize, Serialize};

/// Number of monster slots and spell/trap slots per duelist
pub const FIELD_SLOTS: usize = 5;

/// Which half of the field a slot index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldZone {
    Monsters,
    SpellTraps,
}

/// An ordered pile of cards (deck or graveyard)
///
/// The top of the pile is the end of the vector: decks draw with `pop`,
/// graveyards stack last-in on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPile {
    cards: Vec<CardInstance>,
}

impl CardPile {
    pub fn new() -> Self {
        CardPile { cards: Vec::new() }
    }

    pub fn from_cards(cards: Vec<CardInstance>) -> Self {
        CardPile { cards }
    }

    /// Draw from the top
    pub fn draw_top(&mut self) -> Option<CardInstance> {
        self.cards.pop()
    }

    pub fn peek_top(&self) -> Option<&CardInstance> {
        self.cards.last()
    }

    /// Add to the top
    pub fn add(&mut self, card: CardInstance) {
        self.cards.push(card);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CardInstance> {
        self.cards.iter()
    }

    /// Remove and return the first card (from the bottom up) matching the
    /// predicate
    pub fn take_first(&mut self, pred: impl Fn(&CardInstance) -> bool) -> Option<CardInstance> {
        let pos = self.cards.iter().position(pred)?;
        Some(self.cards.remove(pos))
    }

    /// Remove and return the matching card with the highest current attack
    pub fn take_strongest(&mut self, pred: impl Fn(&CardInstance) -> bool) -> Option<CardInstance> {
        let pos = self
            .cards
            .iter()
            .enumerate()
            .filter(|(_, c)| pred(c))
            .max_by_key(|(_, c)| c.attack)
            .map(|(i, _)| i)?;
        Some(self.cards.remove(pos))
    }

    /// Shuffle the pile
    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }

    /// Remove every card, preserving order
    pub fn drain_all(&mut self) -> Vec<CardInstance> {
        std::mem::take(&mut self.cards)
    }
}

/// A duelist's battlefield: five monster slots and five spell/trap slots
///
/// Slots are sparse; the 5-slot arrays are themselves the "at most five
/// cards per zone" invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub monsters: [Option<CardInstance>; FIELD_SLOTS],
    pub spell_traps: [Option<CardInstance>; FIELD_SLOTS],
}

impl Field {
    pub fn new() -> Self {
        Field::default()
    }

    pub fn monster(&self, slot: usize) -> Option<&CardInstance> {
        self.monsters.get(slot).and_then(|s| s.as_ref())
    }

    pub fn monster_mut(&mut self, slot: usize) -> Option<&mut CardInstance> {
        self.monsters.get_mut(slot).and_then(|s| s.as_mut())
    }

    pub fn spell_trap(&self, slot: usize) -> Option<&CardInstance> {
        self.spell_traps.get(slot).and_then(|s| s.as_ref())
    }

    pub fn spell_trap_mut(&mut self, slot: usize) -> Option<&mut CardInstance> {
        self.spell_traps.get_mut(slot).and_then(|s| s.as_mut())
    }

    pub fn take_monster(&mut self, slot: usize) -> Option<CardInstance> {
        self.monsters.get_mut(slot).and_then(|s| s.take())
    }

    pub fn take_spell_trap(&mut self, slot: usize) -> Option<CardInstance> {
        self.spell_traps.get_mut(slot).and_then(|s| s.take())
    }

    pub fn first_empty_monster_slot(&self) -> Option<usize> {
        self.monsters.iter().position(|s| s.is_none())
    }

    pub fn first_empty_spell_trap_slot(&self) -> Option<usize> {
        self.spell_traps.iter().position(|s| s.is_none())
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.iter().filter(|s| s.is_some()).count()
    }

    pub fn spell_trap_count(&self) -> usize {
        self.spell_traps.iter().filter(|s| s.is_some()).count()
    }

    /// Occupied monster slots in slot order
    pub fn occupied_monsters(&self) -> impl Iterator<Item = (usize, &CardInstance)> {
        self.monsters
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|c| (i, c)))
    }

    /// Occupied spell/trap slots in slot order
    pub fn occupied_spell_traps(&self) -> impl Iterator<Item = (usize, &CardInstance)> {
        self.spell_traps
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|c| (i, c)))
    }

    /// Slot of the occupied monster with the highest current attack
    pub fn strongest_monster_slot(&self) -> Option<usize> {
        self.occupied_monsters()
            .max_by_key(|(_, c)| c.attack)
            .map(|(i, _)| i)
    }

    /// The most recently placed monster, taken as the highest occupied slot
    pub fn newest_monster_slot(&self) -> Option<usize> {
        self.occupied_monsters().map(|(i, _)| i).last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardDefinition, CardKind, CardName};
    use smallvec::SmallVec;
    use std::sync::Arc;

    fn monster(name: &str, attack: i32) -> CardInstance {
        CardInstance::new(Arc::new(CardDefinition {
            name: CardName::new(name),
            kind: CardKind::Monster,
            attack,
            defense: 1000,
            level: 4,
            effect: None,
            trap_trigger: None,
            tags: SmallVec::new(),
            text: String::new(),
        }))
    }

    #[test]
    fn test_pile_draw_order() {
        let mut pile = CardPile::new();
        pile.add(monster("bottom", 100));
        pile.add(monster("middle", 200));
        pile.add(monster("top", 300));

        assert_eq!(pile.peek_top().unwrap().name().as_str(), "top");
        assert_eq!(pile.draw_top().unwrap().name().as_str(), "top");
        assert_eq!(pile.draw_top().unwrap().name().as_str(), "middle");
        assert_eq!(pile.draw_top().unwrap().name().as_str(), "bottom");
        assert!(pile.draw_top().is_none());
    }

    #[test]
    fn test_take_strongest() {
        let mut pile = CardPile::new();
        pile.add(monster("weak", 800));
        pile.add(monster("strong", 2200));
        pile.add(monster("mid", 1500));

        let taken = pile.take_strongest(|c| c.is_monster()).unwrap();
        assert_eq!(taken.name().as_str(), "strong");
        assert_eq!(pile.len(), 2);
    }

    #[test]
    fn test_field_slots() {
        let mut field = Field::new();
        assert_eq!(field.first_empty_monster_slot(), Some(0));

        field.monsters[0] = Some(monster("a", 1000));
        field.monsters[2] = Some(monster("b", 2000));
        assert_eq!(field.first_empty_monster_slot(), Some(1));
        assert_eq!(field.monster_count(), 2);
        assert_eq!(field.strongest_monster_slot(), Some(2));
        assert_eq!(field.newest_monster_slot(), Some(2));

        let taken = field.take_monster(2).unwrap();
        assert_eq!(taken.name().as_str(), "b");
        assert!(field.monster(2).is_none());
    }
}
