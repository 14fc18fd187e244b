//! Deck Manager: opportunity, expense and charity decks.
//!
//! Each deck is shuffled independently. A draw from an exhausted deck
//! reshuffles it first, so drawing from a non-empty deck never fails.

pub mod catalog;
pub mod deck;
pub mod errors;
pub mod manager;
pub mod models;

pub use deck::Deck;
pub use errors::{CardError, CardResult};
pub use manager::DeckManager;
pub use models::{
    Card, CardAction, CardOutcome, CardStats, DeckInfo, DeckType, DrawRecord, DrawnCard,
};
