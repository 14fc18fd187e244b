//! Dice error types.

use crate::errors::ErrorCategory;
use thiserror::Error;

/// Dice roller errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiceError {
    /// A roll is already in flight
    #[error("Dice are already rolling")]
    AlreadyRolling,

    /// `finish_roll` called without a matching `start_roll`
    #[error("No roll in progress")]
    NotRolling,

    /// Roller was destroyed
    #[error("Dice roller has been destroyed")]
    Destroyed,

    /// Configured faces do not form a range
    #[error("Invalid dice range {min}..={max}")]
    InvalidRange { min: u8, max: u8 },
}

impl DiceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DiceError::InvalidRange { .. } => ErrorCategory::ValidationFailure,
            _ => ErrorCategory::StateConflict,
        }
    }
}

/// Result type for dice operations
pub type DiceResult<T> = Result<T, DiceError>;
