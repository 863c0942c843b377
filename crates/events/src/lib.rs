//! Session event bus.
//!
//! UI layers observe session transitions (sign-in, sign-out, new
//! recommendations) through a broadcast channel instead of polling state.

use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// Events published by the session as its state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { uid: String, display_name: String },
    SignedOut,
    BookAdded { book_id: String },
}

/// Cloneable handle on a broadcast channel of session events.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, event: SessionEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::trace!(?event, "no subscribers for session event");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
