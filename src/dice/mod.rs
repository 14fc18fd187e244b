//! Dice Roller: two dice drawn uniformly from the configured range.
//!
//! A roll request made while another roll is in flight is rejected with
//! [`DiceError::AlreadyRolling`] rather than queued.

pub mod errors;
pub mod models;
pub mod roller;

pub use errors::{DiceError, DiceResult};
pub use models::{DieValue, RollOptions, RollRecord, RollResult, RollState, RollStats};
pub use roller::{DiceRoller, roll_d6};
