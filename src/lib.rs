//! Duel Forge - a turn-based card-duel rules engine
//!
//! Two duelists alternate turns playing monster, spell, and trap cards
//! onto a shared field until one side's life points reach zero. The crate
//! is the rules core only: synchronous state transitions, typed effects,
//! a heuristic opponent, and queued presentation cues for whatever layer
//! embeds it.

pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod store;
pub mod zones;

pub use error::{DuelError, Result};
