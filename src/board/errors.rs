//! Board error types.

use super::models::Track;
use crate::{
    errors::ErrorCategory,
    players::{PlayerError, PlayerId},
};
use thiserror::Error;

/// Board errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardError {
    /// A movement is already in flight
    #[error("A player is already moving")]
    AlreadyMoving,

    /// `complete_move` without a matching `begin_move`
    #[error("No movement in progress")]
    NotMoving,

    /// Offset outside the track
    #[error("Position {offset} is outside the {track} track ({cells} cells)")]
    InvalidPosition {
        offset: usize,
        track: Track,
        cells: usize,
    },

    /// Track configured without cells
    #[error("Track has no cells")]
    EmptyTrack,

    /// Explicit outer-track move requested away from PAYDAY
    #[error("Player {0} is not on the inner PAYDAY cell")]
    NotAtPayday(PlayerId),

    /// Player lookup or position update failed
    #[error(transparent)]
    Player(#[from] PlayerError),

    /// Board was destroyed
    #[error("Board has been destroyed")]
    Destroyed,
}

impl BoardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BoardError::AlreadyMoving | BoardError::NotMoving | BoardError::Destroyed => {
                ErrorCategory::StateConflict
            }
            BoardError::InvalidPosition { .. }
            | BoardError::EmptyTrack
            | BoardError::NotAtPayday(_) => ErrorCategory::ValidationFailure,
            BoardError::Player(err) => err.category(),
        }
    }
}

/// Result type for board operations
pub type BoardResult<T> = Result<T, BoardError>;
