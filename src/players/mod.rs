//! Players: the external player-state repository seam.
//!
//! The engine reads and mutates players exclusively through the
//! [`PlayerManager`] trait. [`InMemoryPlayerManager`] is the reference
//! implementation used by the simulator and the tests; a persistent store
//! implements the same trait.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{PlayerError, PlayerResult};
pub use manager::{InMemoryPlayerManager, PlayerManager, SharedPlayers};
pub use models::{
    BalanceEntry, EntryDirection, Money, Player, PlayerId, PlayerPatch, Profession,
};
