//! Board data models.

use crate::{cards::DeckType, players::PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// The two concentric tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Inner,
    Outer,
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Track::Inner => write!(f, "inner"),
            Track::Outer => write!(f, "outer"),
        }
    }
}

/// Where a token sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoardPosition {
    pub track: Track,
    pub offset: usize,
}

impl BoardPosition {
    pub fn new(track: Track, offset: usize) -> Self {
        Self { track, offset }
    }

    /// Offset 0 on the inner track
    pub fn start() -> Self {
        Self::new(Track::Inner, 0)
    }
}

impl Default for BoardPosition {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.track, self.offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    Payday,
    Charity,
    Opportunity,
    Expense,
    Neutral,
    Baby,
}

impl CellType {
    /// Types assigned round-robin to cells without a special role
    pub const ROTATION: [CellType; 3] = [CellType::Opportunity, CellType::Expense, CellType::Neutral];

    /// Deck a card is drawn from on this cell
    pub fn deck(self) -> Option<DeckType> {
        match self {
            CellType::Opportunity => Some(DeckType::Opportunity),
            CellType::Expense => Some(DeckType::Expense),
            CellType::Charity => Some(DeckType::Charity),
            CellType::Payday | CellType::Neutral | CellType::Baby => None,
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            CellType::Payday => "payday",
            CellType::Charity => "charity",
            CellType::Opportunity => "opportunity",
            CellType::Expense => "expense",
            CellType::Neutral => "neutral",
            CellType::Baby => "baby",
        };
        write!(f, "{repr}")
    }
}

/// Actions offered to a player standing on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellAction {
    Payday,
    Charity,
    DrawCard,
    Pay,
    Skip,
    Baby,
}

/// Derived cell metadata, computed on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// e.g. `inner_3`
    pub id: String,
    pub position: usize,
    pub track: Track,
    pub cell_type: CellType,
    pub name: String,
    pub description: String,
    pub actions: Vec<CellAction>,
}

/// Result of advancing along one track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMove {
    pub new_position: usize,
    /// `start + steps` reached or passed the end of the track
    pub lap_completed: bool,
}

/// Planned destination from `calculate_new_position`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedMove {
    pub from: BoardPosition,
    pub to: BoardPosition,
    pub steps: usize,
    pub lap_completed: bool,
    pub moved_to_outer: bool,
}

/// A finished movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub player_id: PlayerId,
    pub from: BoardPosition,
    pub to: BoardPosition,
    pub steps: usize,
    pub cell: Cell,
    pub lap_completed: bool,
    pub moved_to_outer: bool,
    pub moved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveState {
    Idle,
    Moving,
}

/// Geometry plus where everyone stands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    pub inner_track_cells: usize,
    pub outer_track_cells: usize,
    pub payday_position: usize,
    pub charity_position: usize,
    pub baby_position: Option<usize>,
    pub player_positions: BTreeMap<PlayerId, BoardPosition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStats {
    pub total_movements: usize,
    pub players_on_inner: usize,
    pub players_on_outer: usize,
    pub is_moving: bool,
}
