//! In-process event bus — typed pub/sub between the channel and the store.
//!
//! Listener invocations are isolated: a failing listener is logged and does
//! not prevent later listeners from running. Listeners must not register or
//! unregister from within a handler (the registry lock is held during
//! emit).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::error;

use galleria_core::AppResult;

use crate::event::{ChannelEvent, EventKind};

/// Token identifying one listener registration, used for removal.
pub type ListenerId = u64;

type Handler = Box<dyn Fn(&ChannelEvent) -> AppResult<()> + Send + Sync>;

/// Registry mapping event kinds to interested listeners.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<HashMap<EventKind, Vec<(ListenerId, Handler)>>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for an event kind.
    ///
    /// Duplicate registrations are additive; each call returns a fresh id.
    pub fn on(
        &self,
        kind: EventKind,
        handler: impl Fn(&ChannelEvent) -> AppResult<()> + Send + Sync + 'static,
    ) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.listeners.write().expect("bus lock poisoned");
        listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Remove the registration with the given id.
    ///
    /// Returns `false` (a no-op) if no such registration exists.
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().expect("bus lock poisoned");
        if let Some(entries) = listeners.get_mut(&kind) {
            if let Some(pos) = entries.iter().position(|(entry_id, _)| *entry_id == id) {
                let _ = entries.remove(pos);
                return true;
            }
        }
        false
    }

    /// Invoke all listeners registered for the event's kind, in
    /// registration order. Zero listeners is a no-op.
    pub fn emit(&self, event: &ChannelEvent) {
        let kind = event.kind();
        let listeners = self.listeners.read().expect("bus lock poisoned");
        if let Some(entries) = listeners.get(&kind) {
            for (id, handler) in entries {
                if let Err(e) = handler(event) {
                    error!(kind = %kind, listener = id, error = %e, "Event listener failed");
                }
            }
        }
    }

    /// Number of listeners registered for a kind.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .read()
            .expect("bus lock poisoned")
            .get(&kind)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }
}
