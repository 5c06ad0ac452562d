//! Environment event sink trait and implementations.

use std::sync::{Arc, Mutex};

use log::debug;
use tokio::sync::broadcast;

use super::EnvironmentEvent;

/// Default capacity of the broadcast channel behind [`BroadcastEventSink`].
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Trait for receiving environment events.
///
/// # Design Rules
///
/// - `emit()` must be fast and non-blocking (no network calls)
/// - Failure to emit must not affect the switch itself (best-effort)
pub trait EnvironmentEventSink: Send + Sync {
    /// Emit a single event.
    fn emit(&self, event: EnvironmentEvent);

    /// Emit multiple events.
    ///
    /// Default implementation calls `emit()` for each event.
    fn emit_batch(&self, events: Vec<EnvironmentEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

/// No-op implementation for contexts that don't need events.
#[derive(Clone, Default)]
pub struct NoOpEventSink;

impl EnvironmentEventSink for NoOpEventSink {
    fn emit(&self, _event: EnvironmentEvent) {}
}

/// Fans events out to any number of subscribers.
///
/// Subscribers that fall behind lose the oldest events; emitting with no
/// subscribers is not an error.
#[derive(Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<EnvironmentEvent>,
}

impl BroadcastEventSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BROADCAST_CAPACITY)
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EnvironmentEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentEventSink for BroadcastEventSink {
    fn emit(&self, event: EnvironmentEvent) {
        if self.sender.send(event).is_err() {
            debug!("[BroadcastEventSink] No subscribers, event dropped");
        }
    }
}

/// Mock sink for testing - collects emitted events.
#[derive(Clone, Default)]
pub struct MockEventSink {
    events: Arc<Mutex<Vec<EnvironmentEvent>>>,
}

impl MockEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    pub fn events(&self) -> Vec<EnvironmentEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Clears collected events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Returns the number of collected events.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Returns true if no events have been collected.
    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl EnvironmentEventSink for MockEventSink {
    fn emit(&self, event: EnvironmentEvent) {
        self.events.lock().unwrap().push(event);
    }
}
