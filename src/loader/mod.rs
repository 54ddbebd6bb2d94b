//! Catalog and deck loading

pub mod catalog;
pub mod deck;

pub use catalog::{CardCatalog, CardRecord};
pub use deck::DeckLoader;
