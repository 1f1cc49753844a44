//! Fixed-capacity history of recent messages.

use crate::types::Message;
use std::collections::VecDeque;

/// Ring buffer holding the most recent messages, newest first.
///
/// Never grows past its capacity: pushing into a full buffer evicts the
/// oldest entry.
pub struct HistoryBuffer {
    entries: VecDeque<Message>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert a message at the front. Returns the evicted message, if any.
    pub fn push(&mut self, message: Message) -> Option<Message> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_back()
        } else {
            None
        };
        self.entries.push_front(message);
        evicted
    }

    /// Copy of the current contents, newest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.entries.iter().cloned().collect()
    }

    /// Most recent message, if any.
    pub fn latest(&self) -> Option<&Message> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
