//! FIFO event queue shared between the orchestrator and its handlers.

use super::{
    errors::{EventError, EventResult},
    handlers::{EventHandler, GameEventKind},
    models::GameEvent,
};
use crate::{
    bus::{BusEvent, SharedBus},
    players::PlayerId,
};
use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};
use uuid::Uuid;

/// Append-only handle onto the orchestrator's queue.
///
/// Pushing never processes anything. Events pushed while a drain pass is
/// running are picked up by that same pass, in order.
#[derive(Clone)]
pub struct QueueHandle {
    queue: Rc<RefCell<VecDeque<GameEvent>>>,
    closed: Rc<Cell<bool>>,
    bus: SharedBus,
}

impl QueueHandle {
    pub(crate) fn new(bus: SharedBus) -> Self {
        Self {
            queue: Rc::new(RefCell::new(VecDeque::new())),
            closed: Rc::new(Cell::new(false)),
            bus,
        }
    }

    /// Append an event for `player_id` and return its id
    pub fn push(
        &self,
        player_id: &PlayerId,
        kind: impl Into<GameEventKind>,
    ) -> EventResult<Uuid> {
        if self.closed.get() {
            log::warn!("Event queue closed, event rejected");
            return Err(EventError::Destroyed);
        }

        let event = GameEvent::new(player_id.clone(), kind.into());
        let (id, kind) = (event.id, event.kind.kind());

        let len = {
            let mut queue = self.queue.borrow_mut();
            queue.push_back(event);
            queue.len()
        };
        log::debug!("Queued {kind} event {id} for {player_id} ({len} pending)");

        self.bus.emit(BusEvent::EventQueued {
            event_id: id,
            kind,
            player_id: player_id.clone(),
        });

        Ok(id)
    }

    pub(crate) fn pop(&self) -> Option<GameEvent> {
        self.queue.borrow_mut().pop_front()
    }

    /// Keep only events matching `keep`; returns how many were dropped
    pub(crate) fn retain<F>(&self, keep: F) -> usize
    where
        F: FnMut(&GameEvent) -> bool,
    {
        let mut queue = self.queue.borrow_mut();
        let before = queue.len();
        queue.retain(keep);
        before - queue.len()
    }

    pub(crate) fn close(&self) {
        self.closed.set(true);
        self.queue.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Pending events, front first
    pub fn pending(&self) -> Vec<GameEvent> {
        self.queue.borrow().iter().cloned().collect()
    }
}
