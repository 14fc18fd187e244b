//! # Money Energy
//!
//! Engine for a turn-based financial board game. Players roll two dice,
//! move around a two-track board, draw opportunity and expense cards, and
//! go through a monthly PAYDAY cycle of salary, credit interest and
//! expenses. Running out of money resets a player through a bankruptcy.
//!
//! ## Architecture
//!
//! The engine is split into four components, wired together by the
//! [`EventOrchestrator`](events::EventOrchestrator):
//!
//! - **Dice Roller** ([`dice`]): two dice, double detection, a roll state
//!   machine that rejects re-entrant rolls
//! - **Deck Manager** ([`cards`]): three independently shuffled decks with
//!   implicit reshuffle on exhaustion and card resolution against a balance
//! - **Board Model** ([`board`]): inner and outer circular tracks, landing
//!   cell types and the inner to outer transition
//! - **Event Orchestrator** ([`events`]): a FIFO queue of game events whose
//!   handlers may queue follow-ups; those run later in the same drain pass
//!
//! Player state lives behind the [`PlayerManager`](players::PlayerManager)
//! trait. Components notify listeners through the [`EventBus`](bus::EventBus).
//!
//! ## Example
//!
//! ```
//! use money_energy::{
//!     EventBus, EventOrchestrator, GameConfig, InMemoryPlayerManager, Player, PlayerId,
//!     PlayerManager, Profession, RollOptions,
//! };
//!
//! let store = InMemoryPlayerManager::new().shared();
//! let engineer = Profession::find("engineer").unwrap();
//! store
//!     .borrow_mut()
//!     .add_player(Player::new("ann", "Ann", 10_000).with_profession(engineer))
//!     .unwrap();
//!
//! let mut game = EventOrchestrator::new(GameConfig::default(), store.clone(), EventBus::shared());
//! let report = game.play_turn(&PlayerId::new("ann"), RollOptions::default()).unwrap();
//! assert!(report.roll.total >= 2);
//! ```

/// Two-track board and token movement.
pub mod board;

/// Synchronous publish/subscribe bus.
pub mod bus;

/// Decks, cards and card resolution.
pub mod cards;

/// Game configuration.
pub mod config;

/// Dice rolling.
pub mod dice;

/// Shared error classification.
pub mod errors;

/// Event queue, handlers and the orchestrator.
pub mod events;

/// Bounded history buffers.
pub mod history;

/// Player repository seam.
pub mod players;

pub use board::{Board, BoardPosition, CellType, Track};
pub use bus::{BusEvent, BusTopic, EventBus, SharedBus};
pub use cards::{Card, CardAction, DeckManager, DeckType};
pub use config::{ConfigError, GameConfig};
pub use dice::{DiceRoller, RollOptions, RollResult};
pub use errors::ErrorCategory;
pub use events::{
    BankruptcyReason, EventError, EventKind, EventOrchestrator, EventRecord, GameEventKind,
    TurnReport,
};
pub use history::History;
pub use players::{
    InMemoryPlayerManager, Money, Player, PlayerId, PlayerManager, PlayerPatch, Profession,
    SharedPlayers,
};
