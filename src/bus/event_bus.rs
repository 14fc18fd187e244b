//! Synchronous in-process publish/subscribe.

use super::messages::{BusEvent, BusTopic};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

/// Handle returned by every subscription, used to unsubscribe
pub type ListenerId = u64;

type Callback = Rc<dyn Fn(&BusEvent)>;

struct Listener {
    id: ListenerId,
    /// `None` receives every topic
    topic: Option<BusTopic>,
    once: bool,
    callback: Callback,
}

/// Bus handle shared by every component of one game
pub type SharedBus = Rc<EventBus>;

/// Event bus.
///
/// Listeners run in subscription order on the emitting thread. Dispatch works
/// on a snapshot of the matching listeners, so a callback may subscribe or
/// unsubscribe without disturbing the emit in progress.
#[derive(Default)]
pub struct EventBus {
    listeners: RefCell<Vec<Listener>>,
    next_id: Cell<ListenerId>,
    emitted: Cell<u64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedBus {
        Rc::new(Self::new())
    }

    /// Subscribe to one topic
    pub fn on<F>(&self, topic: BusTopic, callback: F) -> ListenerId
    where
        F: Fn(&BusEvent) + 'static,
    {
        self.subscribe(Some(topic), false, Rc::new(callback))
    }

    /// Subscribe to every topic
    pub fn on_any<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&BusEvent) + 'static,
    {
        self.subscribe(None, false, Rc::new(callback))
    }

    /// Subscribe for the next event on `topic` only
    pub fn once<F>(&self, topic: BusTopic, callback: F) -> ListenerId
    where
        F: Fn(&BusEvent) + 'static,
    {
        self.subscribe(Some(topic), true, Rc::new(callback))
    }

    fn subscribe(&self, topic: Option<BusTopic>, once: bool, callback: Callback) -> ListenerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.listeners.borrow_mut().push(Listener {
            id,
            topic,
            once,
            callback,
        });
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub fn emit(&self, event: BusEvent) {
        let topic = event.topic();

        let callbacks: Vec<Callback> = {
            let mut listeners = self.listeners.borrow_mut();
            let matched = listeners
                .iter()
                .filter(|l| l.topic.is_none_or(|t| t == topic))
                .map(|l| l.callback.clone())
                .collect();
            listeners.retain(|l| !(l.once && l.topic == Some(topic)));
            matched
        };

        self.emitted.set(self.emitted.get() + 1);
        log::trace!("Emitting {topic} to {} listener(s)", callbacks.len());

        for callback in callbacks {
            callback(&event);
        }
    }

    /// Listeners that would receive `topic`, wildcard listeners included
    pub fn listener_count(&self, topic: BusTopic) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|l| l.topic.is_none_or(|t| t == topic))
            .count()
    }

    /// Number of events emitted since creation
    pub fn emitted_count(&self) -> u64 {
        self.emitted.get()
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}
