//! Error taxonomy shared by every component.
//!
//! Each module defines its own `thiserror` enum (see `dice::errors`,
//! `cards::errors`, ...). All of them map onto one of the categories below so
//! that presentation layers can react to a failure without matching on every
//! module-specific variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Unknown deck type, unknown card action, malformed event or config.
    ValidationFailure,
    /// Missing player or missing collaborator.
    NotFound,
    /// Balance below the amount required by the operation.
    InsufficientFunds,
    /// Re-entrant roll/move, or a call made after `destroy`.
    StateConflict,
    /// Unexpected failure inside an event handler.
    InternalFailure,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::ValidationFailure => "validation_failure",
            Self::NotFound => "not_found",
            Self::InsufficientFunds => "insufficient_funds",
            Self::StateConflict => "state_conflict",
            Self::InternalFailure => "internal_failure",
        };
        write!(f, "{repr}")
    }
}
