//! Core game types and entities

pub mod card;
pub mod duelist;
pub mod effects;
pub mod types;

pub use card::{CardDefinition, CardInstance, CardKind, Expiry, Position, TempEffect};
pub use duelist::{Duelist, STARTING_LIFE_POINTS};
pub use effects::{CardEffect, EffectKind, EffectTrigger, TrapTrigger};
pub use types::{CardName, DuelistName, Tag};
