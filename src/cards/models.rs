//! Card data models.

use super::errors::CardError;
use crate::{
    errors::ErrorCategory,
    players::{Money, PlayerId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A single card. Immutable once dealt into a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    /// Price to buy, pay or donate
    pub amount: Money,
    /// Recurring monthly income granted when bought
    pub income: Option<Money>,
    /// Recurring monthly expense added when paid
    pub monthly_expense: Option<Money>,
    /// Category tag, e.g. `stock` or `tax`
    pub category: String,
    pub description: String,
}

impl Card {
    pub fn new(id: &str, name: &str, amount: Money, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            amount,
            income: None,
            monthly_expense: None,
            category: category.to_string(),
            description: String::new(),
        }
    }

    #[must_use]
    pub fn with_income(mut self, income: Money) -> Self {
        self.income = Some(income);
        self
    }

    #[must_use]
    pub fn with_monthly_expense(mut self, expense: Money) -> Self {
        self.monthly_expense = Some(expense);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (${})", self.name, self.amount)?;
        if let Some(income) = self.income {
            write!(f, " +${income}/mo")?;
        }
        Ok(())
    }
}

/// The three decks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckType {
    Opportunity,
    Expense,
    Charity,
}

impl DeckType {
    pub const ALL: [DeckType; 3] = [DeckType::Opportunity, DeckType::Expense, DeckType::Charity];
}

impl fmt::Display for DeckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckType::Opportunity => write!(f, "opportunity"),
            DeckType::Expense => write!(f, "expense"),
            DeckType::Charity => write!(f, "charity"),
        }
    }
}

impl FromStr for DeckType {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opportunity" => Ok(DeckType::Opportunity),
            "expense" => Ok(DeckType::Expense),
            "charity" => Ok(DeckType::Charity),
            _ => Err(CardError::UnknownDeck(s.to_string())),
        }
    }
}

/// What a player does with a drawn card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardAction {
    Buy,
    Pay,
    Charity,
    Skip,
}

impl fmt::Display for CardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardAction::Buy => write!(f, "buy"),
            CardAction::Pay => write!(f, "pay"),
            CardAction::Charity => write!(f, "charity"),
            CardAction::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for CardAction {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(CardAction::Buy),
            "pay" => Ok(CardAction::Pay),
            "charity" => Ok(CardAction::Charity),
            "skip" => Ok(CardAction::Skip),
            _ => Err(CardError::UnknownAction(s.to_string())),
        }
    }
}

/// Result of `process_card`, returned for every resolved action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardOutcome {
    pub card: Card,
    pub action: CardAction,
    pub player_id: PlayerId,
    pub success: bool,
    pub message: String,
    /// Signed balance change, negative for money spent
    pub financial_impact: Money,
    /// Set when `success` is false
    pub category: Option<ErrorCategory>,
    pub timestamp: DateTime<Utc>,
}

/// A card handed out by `draw`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnCard {
    pub card: Card,
    pub deck: DeckType,
    /// The deck was exhausted and reshuffled before this draw
    pub reshuffled: bool,
}

/// Draw history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawRecord {
    pub card: Card,
    pub deck: DeckType,
    pub player_id: Option<PlayerId>,
    pub reshuffled: bool,
    pub drawn_at: DateTime<Utc>,
}

/// Snapshot of one deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckInfo {
    pub deck: DeckType,
    pub total: usize,
    pub remaining: usize,
    pub is_shuffled: bool,
    pub last_shuffle: Option<DateTime<Utc>>,
    pub shuffle_count: u32,
}

impl DeckInfo {
    pub fn drawn(&self) -> usize {
        self.total - self.remaining
    }
}

/// Deck manager statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardStats {
    pub total_decks: usize,
    pub current_card: Option<String>,
    pub draws_recorded: usize,
    pub processed_recorded: usize,
    pub decks: Vec<DeckInfo>,
}
