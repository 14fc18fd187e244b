//! Dice data models.

use crate::players::PlayerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Face value of a single die.
pub type DieValue = u8;

/// Outcome of rolling both dice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub values: [DieValue; 2],
    pub total: u16,
    pub is_double: bool,
    pub can_roll_again: bool,
    pub rolled_at: DateTime<Utc>,
}

impl RollResult {
    pub fn new(values: [DieValue; 2], double_roll_bonus: bool) -> Self {
        let is_double = values[0] == values[1];
        Self {
            values,
            total: u16::from(values[0]) + u16::from(values[1]),
            is_double,
            can_roll_again: is_double && double_roll_bonus,
            rolled_at: Utc::now(),
        }
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {} = {}", self.values[0], self.values[1], self.total)?;
        if self.is_double {
            write!(f, " (double)")?;
        }
        Ok(())
    }
}

/// Per-roll overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOptions {
    /// Forces both dice to this value, clamped into the configured range.
    pub fixed_value: Option<i64>,
}

impl RollOptions {
    pub fn fixed(value: i64) -> Self {
        Self {
            fixed_value: Some(value),
        }
    }
}

/// Roller state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollState {
    Idle,
    Rolling,
}

/// History entry tagged with the acting player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollRecord {
    pub result: RollResult,
    pub player_id: Option<PlayerId>,
}

/// Aggregate view over the roll history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollStats {
    pub total_rolls: usize,
    pub average_roll: f64,
    pub doubles_count: usize,
    pub doubles_percentage: u32,
    pub most_common_roll: Option<u16>,
}
