//! Player repository error types.

use super::models::PlayerId;
use crate::errors::ErrorCategory;
use thiserror::Error;

/// Player repository errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlayerError {
    /// Player not found
    #[error("Player not found: {0}")]
    NotFound(PlayerId),

    /// Player id already taken
    #[error("Player already exists: {0}")]
    AlreadyExists(PlayerId),

    /// No players registered, so there is no current player
    #[error("No players in the game")]
    NoPlayers,
}

impl PlayerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PlayerError::NotFound(_) | PlayerError::NoPlayers => ErrorCategory::NotFound,
            PlayerError::AlreadyExists(_) => ErrorCategory::ValidationFailure,
        }
    }
}

/// Result type for player repository operations
pub type PlayerResult<T> = Result<T, PlayerError>;
