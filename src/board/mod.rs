//! Board Model: an inner and an outer circular track.
//!
//! Cells are derived on demand from `(position, track)`. Movement wraps
//! modulo the track size and runs through an Idle -> Moving -> Idle state
//! machine that rejects concurrent moves.

#[allow(clippy::module_inception)]
pub mod board;
pub mod errors;
pub mod models;

pub use board::{Board, advance};
pub use errors::{BoardError, BoardResult};
pub use models::{
    BoardInfo, BoardPosition, BoardStats, Cell, CellAction, CellType, MoveOutcome, MoveState,
    PlannedMove, Track, TrackMove,
};
