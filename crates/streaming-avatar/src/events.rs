//! A typed dispatch table for client events.

use crate::types::{AvatarEvent, StreamingEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// A callback registered for one [`StreamingEvent`].
///
/// Handlers are compared by pointer identity, so the same `Arc` must be passed
/// to `off` that was passed to `on`.
pub type EventHandler = Arc<dyn Fn(&AvatarEvent) + Send + Sync>;

/// Maps each event tag to the handlers registered for it, in registration order.
#[derive(Default)]
pub struct EventRegistry {
    handlers: Mutex<HashMap<StreamingEvent, Vec<EventHandler>>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `event`. Registering the same handler twice
    /// makes it run twice per emission.
    pub fn on(&self, event: StreamingEvent, handler: EventHandler) {
        self.handlers.lock().entry(event).or_default().push(handler);
    }

    /// Removes one registration of `handler` for `event`.
    ///
    /// Returns `false` if the handler was not registered for that event.
    pub fn off(&self, event: StreamingEvent, handler: &EventHandler) -> bool {
        let mut handlers = self.handlers.lock();
        let Some(list) = handlers.get_mut(&event) else {
            return false;
        };
        match list.iter().position(|h| Arc::ptr_eq(h, handler)) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Invokes every handler registered for `event.event` and returns how many ran.
    ///
    /// The table lock is released before handlers run, so a handler may call
    /// `on`/`off` on this registry.
    pub fn emit(&self, event: &AvatarEvent) -> usize {
        let snapshot: Vec<EventHandler> = self
            .handlers
            .lock()
            .get(&event.event)
            .cloned()
            .unwrap_or_default();
        trace!(event = ?event.event, handlers = snapshot.len(), "Dispatching event");
        for handler in &snapshot {
            handler(event);
        }
        snapshot.len()
    }

    pub fn handler_count(&self, event: StreamingEvent) -> usize {
        self.handlers.lock().get(&event).map_or(0, Vec::len)
    }
}
