//! Persistence seam: an injected key-value store
//!
//! The rules engine never touches persisted state directly; deck building
//! reads the saved deck list through this trait, and everything else
//! (collection, currency) belongs to the embedding layer.

use rustc_hash::FxHashMap;

/// Well-known store keys
pub mod keys {
    /// JSON array of card names making up the saved player deck
    pub const PLAYER_DECK: &str = "player_deck";
    /// JSON array of owned card names (not read by the core)
    pub const COLLECTION: &str = "collection";
    /// Currency balance (not read by the core)
    pub const CREDITS: &str = "credits";
}

/// Minimal get/set string store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// In-memory store, used by tests and the CLI
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: FxHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.map.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get(keys::PLAYER_DECK), None);

        store.set(keys::PLAYER_DECK, r#"["Core Warden"]"#.to_string());
        assert_eq!(
            store.get(keys::PLAYER_DECK).as_deref(),
            Some(r#"["Core Warden"]"#)
        );
    }
}
