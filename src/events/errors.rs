//! Event orchestrator error types.

use crate::{
    board::BoardError, cards::CardError, dice::DiceError, errors::ErrorCategory,
    players::PlayerError,
};
use thiserror::Error;

/// Orchestrator and handler errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    /// Event kind name not recognised
    #[error("Unknown event kind: {0}")]
    UnknownKind(String),

    /// Bankruptcy reason name not recognised
    #[error("Unknown bankruptcy reason: {0}")]
    UnknownReason(String),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Card(#[from] CardError),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Dice(#[from] DiceError),

    /// Dice or a token are still mid-animation
    #[error("A turn is already in progress")]
    TurnInProgress,

    /// Orchestrator was destroyed
    #[error("Event orchestrator has been destroyed")]
    Destroyed,
}

impl EventError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EventError::UnknownKind(_) | EventError::UnknownReason(_) => {
                ErrorCategory::ValidationFailure
            }
            EventError::Player(err) => err.category(),
            EventError::Card(err) => err.category(),
            EventError::Board(err) => err.category(),
            EventError::Dice(err) => err.category(),
            EventError::TurnInProgress | EventError::Destroyed => ErrorCategory::StateConflict,
        }
    }
}

/// Result type for orchestrator operations
pub type EventResult<T> = Result<T, EventError>;
