//! Per-actor FIFO message queue.
//!
//! Messages going in and out of the mailbox are both cloned, so nothing gets
//! mutated accidentally: a handler scribbling on the message it received can
//! never corrupt the stored copy, and a message returned to a caller never
//! aliases queue-internal storage. This is the load-bearing isolation
//! property of the whole runtime.
//!
//! The mailbox has no single-flight logic of its own. At-most-one concurrent
//! drain is enforced by the supervisor driving it.

use crate::message::Message;
use parking_lot::Mutex;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct Mailbox {
    messages: Mutex<VecDeque<Message>>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a deep clone of the message. Insertion order is delivery order.
    pub fn deliver(&self, message: &Message) {
        self.messages.lock().push_back(message.clone());
    }

    /// Deep clone of the head of the queue, or `None` when empty. The stored
    /// entry stays in place until [`Mailbox::delete_oldest`].
    pub fn get_oldest(&self) -> Option<Message> {
        self.messages.lock().front().cloned()
    }

    pub fn delete_oldest(&self) {
        self.messages.lock().pop_front();
    }

    /// Deep clones of every queued message, oldest first.
    pub fn get_all(&self) -> Vec<Message> {
        self.messages.lock().iter().cloned().collect()
    }

    pub fn delete_all(&self) {
        self.messages.lock().clear();
    }

    pub fn has_messages(&self) -> bool {
        !self.messages.lock().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }
}
