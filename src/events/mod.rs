//! Event Orchestrator: FIFO queue of game events and their handlers.
//!
//! Every rule that moves money or tokens runs as a queued event. Handlers
//! may queue follow-ups (a landing cell queues PAYDAY, PAYDAY may queue a
//! bankruptcy); those run later in the same drain pass, never recursively.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod queue;

pub use errors::{EventError, EventResult};
pub use handlers::{
    BabyBornEvent, BankruptcyEvent, CardDrawEvent, CharityEvent, EventHandler, GameEventKind,
    HandlerContext, MovementEvent, PaydayEvent, percent_of,
};
pub use models::{
    BankruptcyReason, EventKind, EventOutcome, EventRecord, EventStats, GameEvent,
    OrchestratorState, OutcomeDetails, TurnReport,
};
pub use orchestrator::EventOrchestrator;
pub use queue::QueueHandle;
