//! Per-actor state cell.
//!
//! State is JSON-safe data, defensively copied in and out: a handler may
//! freely mutate the value it was given without touching the authoritative
//! copy, and the authoritative copy can only change through [`StateHandler::set`].

use crate::message::Payload;
use parking_lot::Mutex;

#[derive(Debug)]
pub struct StateHandler {
    state: Mutex<Payload>,
}

impl StateHandler {
    pub fn new(initial_state: Payload) -> Self {
        Self {
            state: Mutex::new(initial_state),
        }
    }

    /// Deep copy of the current state.
    pub fn get(&self) -> Payload {
        self.state.lock().clone()
    }

    /// Replace the authoritative state. The value is owned, so the caller
    /// keeps no handle into the cell.
    pub fn set(&self, new_state: Payload) {
        *self.state.lock() = new_state;
    }
}
