//! Event data models.

use super::{
    errors::EventError,
    handlers::{EventHandler, GameEventKind},
};
use crate::{
    board::MoveOutcome,
    cards::DrawnCard,
    dice::RollResult,
    errors::ErrorCategory,
    players::{Money, PlayerId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use uuid::Uuid;

/// Event discriminant, used for stats and bus notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Payday,
    Charity,
    Bankruptcy,
    CardDraw,
    Movement,
    BabyBorn,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            EventKind::Payday => "payday",
            EventKind::Charity => "charity",
            EventKind::Bankruptcy => "bankruptcy",
            EventKind::CardDraw => "card_draw",
            EventKind::Movement => "movement",
            EventKind::BabyBorn => "baby_born",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for EventKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payday" | "receive_salary" => Ok(EventKind::Payday),
            "charity" => Ok(EventKind::Charity),
            "bankruptcy" => Ok(EventKind::Bankruptcy),
            "card_draw" => Ok(EventKind::CardDraw),
            "movement" => Ok(EventKind::Movement),
            "baby_born" => Ok(EventKind::BabyBorn),
            _ => Err(EventError::UnknownKind(s.to_string())),
        }
    }
}

/// Why a bankruptcy was queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankruptcyReason {
    InsufficientFunds,
    InsufficientFundsAfterCreditPayment,
    InsufficientFundsAfterExpenses,
    InsufficientFundsAfterCard,
}

impl fmt::Display for BankruptcyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            BankruptcyReason::InsufficientFunds => "insufficient_funds",
            BankruptcyReason::InsufficientFundsAfterCreditPayment => {
                "insufficient_funds_after_credit_payment"
            }
            BankruptcyReason::InsufficientFundsAfterExpenses => "insufficient_funds_after_expenses",
            BankruptcyReason::InsufficientFundsAfterCard => "insufficient_funds_after_card",
        };
        write!(f, "{repr}")
    }
}

impl FromStr for BankruptcyReason {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insufficient_funds" => Ok(BankruptcyReason::InsufficientFunds),
            "insufficient_funds_after_credit_payment" => {
                Ok(BankruptcyReason::InsufficientFundsAfterCreditPayment)
            }
            "insufficient_funds_after_expenses" => {
                Ok(BankruptcyReason::InsufficientFundsAfterExpenses)
            }
            "insufficient_funds_after_card" => Ok(BankruptcyReason::InsufficientFundsAfterCard),
            _ => Err(EventError::UnknownReason(s.to_string())),
        }
    }
}

/// A queued game event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub id: Uuid,
    pub player_id: PlayerId,
    pub kind: GameEventKind,
    pub queued_at: DateTime<Utc>,
    pub processed: bool,
}

impl GameEvent {
    pub fn new(player_id: PlayerId, kind: GameEventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            kind,
            queued_at: Utc::now(),
            processed: false,
        }
    }
}

/// Handler-specific data attached to an outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutcomeDetails {
    Empty,
    Payday {
        income: Money,
        salary: Money,
        passive_income: Money,
        credit_interest: Money,
        expenses: Money,
        child_expenses: Money,
        balance: Money,
    },
    Charity {
        amount: Money,
    },
    Bankruptcy {
        reason: BankruptcyReason,
        bankruptcy_count: u32,
        /// Duplicate within one drain pass; no state was touched
        suppressed: bool,
    },
    CardDraw {
        drawn: DrawnCard,
    },
    Movement {
        outcome: MoveOutcome,
    },
    BabyBorn {
        die: u8,
        baby_born: bool,
        children: u8,
        bonus: Money,
    },
}

/// Result of handling one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub success: bool,
    pub message: String,
    /// Set when `success` is false
    pub category: Option<ErrorCategory>,
    pub details: OutcomeDetails,
}

impl EventOutcome {
    pub fn success(message: impl Into<String>, details: OutcomeDetails) -> Self {
        Self {
            success: true,
            message: message.into(),
            category: None,
            details,
        }
    }

    pub fn failure(message: impl Into<String>, category: ErrorCategory) -> Self {
        Self {
            success: false,
            message: message.into(),
            category: Some(category),
            details: OutcomeDetails::Empty,
        }
    }
}

/// Event history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event: GameEvent,
    pub outcome: EventOutcome,
    pub processed_at: DateTime<Utc>,
}

impl EventRecord {
    pub fn kind(&self) -> EventKind {
        self.event.kind.kind()
    }
}

/// Everything that happened during one `play_turn`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    pub player_id: PlayerId,
    pub roll: RollResult,
    /// Events resolved by the turn's drain, in processing order
    pub outcomes: Vec<EventRecord>,
}

impl TurnReport {
    /// Card drawn during the turn, if any
    pub fn drawn_card(&self) -> Option<&DrawnCard> {
        self.outcomes
            .iter()
            .find_map(|record| match &record.outcome.details {
                OutcomeDetails::CardDraw { drawn } => Some(drawn),
                _ => None,
            })
    }

    pub fn went_bankrupt(&self) -> bool {
        self.outcomes.iter().any(|record| {
            matches!(
                record.outcome.details,
                OutcomeDetails::Bankruptcy {
                    suppressed: false,
                    ..
                }
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrchestratorState {
    Idle,
    Draining,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStats {
    pub total_events: usize,
    pub by_kind: BTreeMap<EventKind, usize>,
    pub failures: usize,
    pub queue_length: usize,
    pub draining: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!("card_draw".parse::<EventKind>().unwrap(), EventKind::CardDraw);
        assert_eq!("receive_salary".parse::<EventKind>().unwrap(), EventKind::Payday);
        let err = "lottery".parse::<EventKind>().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationFailure);
    }

    #[test]
    fn test_reason_display_roundtrip() {
        let reason = BankruptcyReason::InsufficientFundsAfterCreditPayment;
        assert_eq!(
            reason.to_string(),
            "insufficient_funds_after_credit_payment"
        );
        assert_eq!(reason.to_string().parse::<BankruptcyReason>().unwrap(), reason);
    }

    #[test]
    fn test_failure_outcome() {
        let outcome = EventOutcome::failure("boom", ErrorCategory::InternalFailure);
        assert!(!outcome.success);
        assert_eq!(outcome.category, Some(ErrorCategory::InternalFailure));
        assert_eq!(outcome.details, OutcomeDetails::Empty);
    }
}
