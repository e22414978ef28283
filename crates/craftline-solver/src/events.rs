//! Notification bus for solver events.

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why the craftability cache was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvalidationReason {
    /// A caller asked for it
    Explicit,
    /// The inventory fingerprint changed between solves
    FingerprintChanged,
    /// The maximum entry age elapsed
    Expired,
}

/// Events published by the solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolverEvent {
    /// A solve call finished with results
    SolveCompleted {
        /// Recipes with at least one possible craft
        craftable_count: usize,
        /// Recipes evaluated
        recipes_processed: usize,
        /// Wall time of the solve
        elapsed: Duration,
    },
    /// The craftability cache was cleared
    CacheInvalidated {
        /// Entries dropped
        entries_cleared: usize,
        /// When it happened
        at: DateTime<Utc>,
        /// What triggered it
        reason: InvalidationReason,
    },
}

/// Event bus for broadcasting solver events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<SolverEvent>,
    /// Receiver for collecting events
    receiver: Receiver<SolverEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: SolverEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<SolverEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<SolverEvent> {
        self.sender.clone()
    }

    /// Returns a receiver handle. Receivers share one queue, so each event
    /// is delivered to exactly one of them.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<SolverEvent> {
        self.receiver.clone()
    }
}
