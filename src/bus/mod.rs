//! Typed event bus connecting the engine to presentation layers.

pub mod event_bus;
pub mod messages;

pub use event_bus::{EventBus, ListenerId, SharedBus};
pub use messages::{BusEvent, BusTopic};
