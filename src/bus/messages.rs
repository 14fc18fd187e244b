//! Bus message types.

use crate::{
    board::{BoardPosition, MoveOutcome, Track},
    cards::{Card, CardAction, CardOutcome, DeckType},
    dice::{RollOptions, RollResult},
    events::{BankruptcyReason, EventKind, EventRecord, TurnReport},
    players::{Money, PlayerId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Everything the engine announces to presentation layers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusEvent {
    /// Dice entered the Rolling state
    DiceRollStarted {
        player_id: Option<PlayerId>,
        options: RollOptions,
        at: DateTime<Utc>,
    },

    DiceRolled {
        player_id: Option<PlayerId>,
        result: RollResult,
    },

    /// A deck was shuffled, `implicit` when triggered by exhaustion
    DeckShuffled {
        deck: DeckType,
        implicit: bool,
        shuffle_count: u32,
    },

    CardDrawn {
        deck: DeckType,
        card: Card,
        reshuffled: bool,
    },

    CardProcessed {
        player_id: PlayerId,
        action: CardAction,
        outcome: CardOutcome,
    },

    PlayerMovementStarted {
        player_id: PlayerId,
        from: BoardPosition,
        steps: usize,
    },

    PlayerMoved {
        player_id: PlayerId,
        outcome: MoveOutcome,
    },

    /// Movement wrapped past the end of a track
    LapCompleted { player_id: PlayerId, track: Track },

    MovedToOuterTrack { player_id: PlayerId },

    EventQueued {
        event_id: Uuid,
        kind: EventKind,
        player_id: PlayerId,
    },

    EventProcessed { record: EventRecord },

    PlayerBankrupted {
        player_id: PlayerId,
        reason: BankruptcyReason,
        bankruptcy_count: u32,
    },

    BabyBorn {
        player_id: PlayerId,
        children: u8,
        bonus: Money,
    },

    TurnCompleted { player_id: PlayerId, report: TurnReport },
}

impl BusEvent {
    pub fn topic(&self) -> BusTopic {
        match self {
            BusEvent::DiceRollStarted { .. } => BusTopic::DiceRollStarted,
            BusEvent::DiceRolled { .. } => BusTopic::DiceRolled,
            BusEvent::DeckShuffled { .. } => BusTopic::DeckShuffled,
            BusEvent::CardDrawn { .. } => BusTopic::CardDrawn,
            BusEvent::CardProcessed { .. } => BusTopic::CardProcessed,
            BusEvent::PlayerMovementStarted { .. } => BusTopic::PlayerMovementStarted,
            BusEvent::PlayerMoved { .. } => BusTopic::PlayerMoved,
            BusEvent::LapCompleted { .. } => BusTopic::LapCompleted,
            BusEvent::MovedToOuterTrack { .. } => BusTopic::MovedToOuterTrack,
            BusEvent::EventQueued { .. } => BusTopic::EventQueued,
            BusEvent::EventProcessed { .. } => BusTopic::EventProcessed,
            BusEvent::PlayerBankrupted { .. } => BusTopic::PlayerBankrupted,
            BusEvent::BabyBorn { .. } => BusTopic::BabyBorn,
            BusEvent::TurnCompleted { .. } => BusTopic::TurnCompleted,
        }
    }
}

/// Subscription key, one per [`BusEvent`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusTopic {
    DiceRollStarted,
    DiceRolled,
    DeckShuffled,
    CardDrawn,
    CardProcessed,
    PlayerMovementStarted,
    PlayerMoved,
    LapCompleted,
    MovedToOuterTrack,
    EventQueued,
    EventProcessed,
    PlayerBankrupted,
    BabyBorn,
    TurnCompleted,
}

impl fmt::Display for BusTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            BusTopic::DiceRollStarted => "dice:rollStarted",
            BusTopic::DiceRolled => "dice:rolled",
            BusTopic::DeckShuffled => "cards:deckShuffled",
            BusTopic::CardDrawn => "cards:drawn",
            BusTopic::CardProcessed => "cards:processed",
            BusTopic::PlayerMovementStarted => "board:movementStarted",
            BusTopic::PlayerMoved => "board:playerMoved",
            BusTopic::LapCompleted => "board:lapCompleted",
            BusTopic::MovedToOuterTrack => "board:movedToOuterTrack",
            BusTopic::EventQueued => "events:queued",
            BusTopic::EventProcessed => "events:processed",
            BusTopic::PlayerBankrupted => "player:bankrupted",
            BusTopic::BabyBorn => "player:babyBorn",
            BusTopic::TurnCompleted => "game:turnCompleted",
        };
        write!(f, "{repr}")
    }
}
