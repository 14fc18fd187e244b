//! Card error types.

use super::models::DeckType;
use crate::{errors::ErrorCategory, players::PlayerError};
use thiserror::Error;

/// Deck manager errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CardError {
    /// Deck name not one of opportunity/expense/charity
    #[error("Unknown deck type: {0}")]
    UnknownDeck(String),

    /// Action name not one of buy/pay/charity/skip
    #[error("Unknown card action: {0}")]
    UnknownAction(String),

    /// Deck was built without cards
    #[error("Deck {0} has no cards")]
    EmptyDeck(DeckType),

    /// Player lookup or update failed
    #[error(transparent)]
    Player(#[from] PlayerError),

    /// Deck manager was destroyed
    #[error("Deck manager has been destroyed")]
    Destroyed,
}

impl CardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CardError::UnknownDeck(_) | CardError::UnknownAction(_) => {
                ErrorCategory::ValidationFailure
            }
            CardError::EmptyDeck(_) => ErrorCategory::ValidationFailure,
            CardError::Player(err) => err.category(),
            CardError::Destroyed => ErrorCategory::StateConflict,
        }
    }
}

/// Result type for card operations
pub type CardResult<T> = Result<T, CardError>;
