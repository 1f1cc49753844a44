//! Subscription types for the live message feed.

use crate::types::Message;
use crossbeam_channel::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::fmt;
use std::time::Duration;

/// Default number of messages buffered per subscriber.
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered messages; further messages are dropped for this
    /// subscriber until it catches up.
    /// Default: 256
    pub buffer_size: usize,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl SubscriptionConfig {
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self { buffer_size }
    }
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Handle to a live subscription.
///
/// Yields messages appended after the subscription was created. The feed
/// ends (receive errors) once the subscription is removed from the store.
/// Dropping the handle detaches it; the store prunes it on the next append.
pub struct SubscriptionHandle {
    pub(crate) id: SubscriptionId,
    pub(crate) receiver: Receiver<Message>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Receive the next message (blocking).
    pub fn recv(&self) -> Result<Message, RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message (non-blocking).
    pub fn try_recv(&self) -> Result<Message, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Message, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Messages waiting in this subscriber's buffer.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Blocking iterator over incoming messages.
    pub fn iter(&self) -> crossbeam_channel::Iter<'_, Message> {
        self.receiver.iter()
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("pending", &self.receiver.len())
            .finish()
    }
}

impl IntoIterator for SubscriptionHandle {
    type Item = Message;
    type IntoIter = crossbeam_channel::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.receiver.into_iter()
    }
}

impl<'a> IntoIterator for &'a SubscriptionHandle {
    type Item = Message;
    type IntoIter = crossbeam_channel::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.receiver.iter()
    }
}
