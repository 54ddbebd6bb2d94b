//! Deck building
//!
//! Decks come from three sources, in priority order: a forced list
//! (tutorial), the saved list in the key-value store, or the starter list.
//! Forced decks keep their order; the caller shuffles the others.

use crate::core::CardInstance;
use crate::loader::catalog::CardCatalog;
use crate::store::{keys, KeyValueStore};
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;

/// Deck-list legality bounds
pub const MAX_DECK_SIZE: usize = 40;
pub const MAX_COPIES: usize = 3;

pub struct DeckLoader;

impl DeckLoader {
    /// Fallback deck: 10 low monsters, 4 mid, 2 high, 4 spells, 2 traps
    pub const STARTER_DECK: &'static [&'static str] = &[
        "Core Warden",
        "Core Warden",
        "Cipher Runner",
        "Cipher Runner",
        "Glitch Basilisk",
        "Glitch Basilisk",
        "Static Banshee",
        "Static Banshee",
        "Phantom Sentinel",
        "Phantom Sentinel",
        "Data Golem",
        "Data Golem",
        "Vortex Invader",
        "Vortex Invader",
        "Battle Colossus",
        "Battle Colossus",
        "Overclock Protocol",
        "Overclock Protocol",
        "Data Recovery",
        "Archive Access",
        "Panic Switch",
        "Emergency Firewall",
    ];

    /// Small weak list for the easy opponent tier
    pub const EASY_OPPONENT_DECK: &'static [&'static str] = &[
        "Glitch Basilisk",
        "Glitch Basilisk",
        "Glitch Basilisk",
        "Cipher Runner",
        "Cipher Runner",
        "Core Warden",
        "Core Warden",
        "Plasma Surge",
        "Plasma Surge",
    ];

    /// Forced player deck for the tutorial walkthrough (drawn whole as the
    /// opening hand, tribute fodder included)
    pub const TUTORIAL_PLAYER_DECK: &'static [&'static str] = &[
        "Battle Colossus",
        "Cipher Runner",
        "Core Warden",
        "Glitch Basilisk",
        "Panic Switch",
    ];

    /// The single monster the tutorial opponent starts with on the field
    pub const TUTORIAL_OPPONENT_MONSTER: &'static str = "Glitch Basilisk";

    /// Instantiate a named list into deck order
    pub fn build<S: AsRef<str>>(catalog: &CardCatalog, names: &[S]) -> Result<Vec<CardInstance>> {
        Self::validate(names)?;
        names
            .iter()
            .map(|name| catalog.instantiate(name.as_ref()))
            .collect()
    }

    /// Size and copy limits; anything deeper is out of scope
    fn validate<S: AsRef<str>>(names: &[S]) -> Result<()> {
        if names.len() > MAX_DECK_SIZE {
            return Err(DuelError::InvalidDeckFormat(format!(
                "deck has {} cards (limit {MAX_DECK_SIZE})",
                names.len()
            )));
        }
        let mut copies: FxHashMap<&str, usize> = FxHashMap::default();
        for name in names {
            let count = copies.entry(name.as_ref()).or_insert(0);
            *count += 1;
            if *count > MAX_COPIES {
                return Err(DuelError::InvalidDeckFormat(format!(
                    "more than {MAX_COPIES} copies of {}",
                    name.as_ref()
                )));
            }
        }
        Ok(())
    }

    /// The saved deck from the store when present, the starter list
    /// otherwise
    pub fn saved_or_starter(
        catalog: &CardCatalog,
        store: &dyn KeyValueStore,
    ) -> Result<Vec<CardInstance>> {
        match store.get(keys::PLAYER_DECK) {
            Some(json) => {
                let names: Vec<String> = serde_json::from_str(&json)?;
                Self::build(catalog, &names)
            }
            None => Self::build(catalog, Self::STARTER_DECK),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_starter_deck_builds() {
        let catalog = CardCatalog::builtin();
        let deck = DeckLoader::build(&catalog, DeckLoader::STARTER_DECK).unwrap();
        assert_eq!(deck.len(), 22);
    }

    #[test]
    fn test_saved_deck_preferred_over_starter() {
        let catalog = CardCatalog::builtin();
        let mut store = MemoryStore::new();
        store.set(
            keys::PLAYER_DECK,
            r#"["Core Warden", "Cipher Runner", "Overclock Protocol"]"#.to_string(),
        );

        let deck = DeckLoader::saved_or_starter(&catalog, &store).unwrap();
        assert_eq!(deck.len(), 3);
        assert_eq!(deck[0].name().as_str(), "Core Warden");
    }

    #[test]
    fn test_missing_saved_deck_falls_back() {
        let catalog = CardCatalog::builtin();
        let store = MemoryStore::new();
        let deck = DeckLoader::saved_or_starter(&catalog, &store).unwrap();
        assert_eq!(deck.len(), DeckLoader::STARTER_DECK.len());
    }

    #[test]
    fn test_copy_limit_enforced() {
        let catalog = CardCatalog::builtin();
        let names = ["Core Warden", "Core Warden", "Core Warden", "Core Warden"];
        assert!(DeckLoader::build(&catalog, &names).is_err());
    }

    #[test]
    fn test_unknown_card_in_list_rejected() {
        let catalog = CardCatalog::builtin();
        let names = ["Core Warden", "Totally Fake Card"];
        assert!(DeckLoader::build(&catalog, &names).is_err());
    }
}
