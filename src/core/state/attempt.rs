use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::core::events::EventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptState {
    Idle,
    Resolving,
    Launching,
}

/// Shared attempt state. At most one attempt leaves `Idle` at a time.
#[derive(Debug, Clone)]
pub struct AttemptCell {
    state: Arc<Mutex<AttemptState>>,
    events: EventSink,
}

impl AttemptCell {
    pub fn new(events: EventSink) -> Self {
        Self {
            state: Arc::new(Mutex::new(AttemptState::Idle)),
            events,
        }
    }

    pub fn current(&self) -> AttemptState {
        *self.lock()
    }

    /// `Idle → Resolving`, or `None` if an attempt is already in flight.
    pub fn try_begin(&self) -> Option<AttemptGuard> {
        {
            let mut state = self.lock();
            if *state != AttemptState::Idle {
                return None;
            }
            *state = AttemptState::Resolving;
        }
        self.events.state(AttemptState::Resolving);
        Some(AttemptGuard { cell: self.clone() })
    }

    fn set(&self, next: AttemptState) {
        *self.lock() = next;
        self.events.state(next);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AttemptState> {
        // A poisoned lock still holds a valid enum value.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Held for the duration of one attempt. Dropping it, including during an
/// unwind, returns the cell to `Idle`.
#[derive(Debug)]
pub struct AttemptGuard {
    cell: AttemptCell,
}

impl AttemptGuard {
    /// `Resolving → Launching`, right before the process is spawned.
    pub fn launching(&self) {
        self.cell.set(AttemptState::Launching);
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        self.cell.set(AttemptState::Idle);
    }
}
