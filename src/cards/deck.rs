//! Draw pile with a cursor and implicit reshuffle on exhaustion.

use super::models::{Card, DeckInfo, DeckType};
use chrono::{DateTime, Utc};
use rand::{Rng, seq::SliceRandom};

/// One typed deck.
///
/// `cards` always holds the full multiset; `cursor` marks how many have been
/// dealt. `0 <= cursor <= cards.len()` holds at all times.
#[derive(Debug, Clone)]
pub struct Deck {
    deck_type: DeckType,
    cards: Vec<Card>,
    original: Vec<Card>,
    cursor: usize,
    is_shuffled: bool,
    last_shuffle: Option<DateTime<Utc>>,
    shuffle_count: u32,
}

impl Deck {
    /// Create an unshuffled deck in catalog order
    pub fn new(deck_type: DeckType, cards: Vec<Card>) -> Self {
        Self {
            deck_type,
            original: cards.clone(),
            cards,
            cursor: 0,
            is_shuffled: false,
            last_shuffle: None,
            shuffle_count: 0,
        }
    }

    pub fn deck_type(&self) -> DeckType {
        self.deck_type
    }

    /// Fisher-Yates over the full deck; resets the cursor.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.cursor = 0;
        self.is_shuffled = true;
        self.last_shuffle = Some(Utc::now());
        self.shuffle_count += 1;
    }

    /// Deal the next card, reshuffling first if the deck is exhausted.
    ///
    /// Returns `None` only for a deck with no cards. The flag reports whether
    /// a reshuffle happened.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<(Card, bool)> {
        if self.cards.is_empty() {
            return None;
        }

        let reshuffled = self.cursor >= self.cards.len();
        if reshuffled {
            self.shuffle(rng);
        }

        let card = self.cards.get(self.cursor).cloned()?;
        self.cursor += 1;
        Some((card, reshuffled))
    }

    /// Restore catalog order, unshuffled
    pub fn reset(&mut self) {
        self.cards = self.original.clone();
        self.cursor = 0;
        self.is_shuffled = false;
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.cursor
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_shuffled(&self) -> bool {
        self.is_shuffled
    }

    pub fn shuffle_count(&self) -> u32 {
        self.shuffle_count
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn info(&self) -> DeckInfo {
        DeckInfo {
            deck: self.deck_type,
            total: self.len(),
            remaining: self.remaining(),
            is_shuffled: self.is_shuffled,
            last_shuffle: self.last_shuffle,
            shuffle_count: self.shuffle_count,
        }
    }
}
