//! Subscription manager for broadcasting appended messages.

use crate::types::Message;
use crossbeam_channel::{bounded, Sender, TrySendError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::types::{SubscriptionConfig, SubscriptionHandle, SubscriptionId};

/// Outcome of offering a message to one subscriber.
enum Delivery {
    Sent,
    Dropped,
    Detached,
}

/// Internal subscription state.
struct Subscriber {
    sender: Sender<Message>,
    /// Messages dropped for this subscriber because its buffer was full.
    dropped: AtomicU64,
}

impl Subscriber {
    /// Offer a message without blocking.
    fn try_send(&self, message: Message) -> Delivery {
        match self.sender.try_send(message) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                Delivery::Dropped
            }
            Err(TrySendError::Disconnected(_)) => Delivery::Detached,
        }
    }
}

/// Manages subscriptions and fans out messages.
///
/// A full subscriber loses the message but stays registered; a subscriber
/// whose handle was dropped is removed on the next broadcast.
pub struct SubscriptionManager {
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscriber>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl SubscriptionManager {
    /// Create a new subscription manager.
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Create a new subscription.
    ///
    /// The handle only sees messages broadcast after this call returns.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size.max(1));

        self.subscriptions.write().insert(
            id,
            Subscriber {
                sender,
                dropped: AtomicU64::new(0),
            },
        );
        tracing::debug!(subscription = %id, buffer = config.buffer_size, "subscribed");

        SubscriptionHandle { id, receiver }
    }

    /// Unsubscribe and clean up. Unknown ids are ignored.
    ///
    /// Removing the sender ends the handle's feed once it has drained.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if self.subscriptions.write().remove(&id).is_some() {
            tracing::debug!(subscription = %id, "unsubscribed");
        }
    }

    /// Get subscription count.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Whether the subscription is still registered.
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.subscriptions.read().contains_key(&id)
    }

    /// Messages dropped for one subscription, or `None` if it is not registered.
    pub fn dropped_count(&self, id: SubscriptionId) -> Option<u64> {
        self.subscriptions
            .read()
            .get(&id)
            .map(|sub| sub.dropped.load(Ordering::Relaxed))
    }

    /// Deliveries dropped across all subscriptions since creation.
    pub fn total_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Successful deliveries across all subscriptions since creation.
    pub fn total_delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Offer a message to every subscriber without blocking.
    pub fn broadcast(&self, message: &Message) {
        let mut detached = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                match sub.try_send(message.clone()) {
                    Delivery::Sent => {
                        self.delivered.fetch_add(1, Ordering::Relaxed);
                    }
                    Delivery::Dropped => {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        tracing::debug!(
                            subscription = %id,
                            topic = %message.topic(),
                            "subscriber buffer full, dropping"
                        );
                    }
                    Delivery::Detached => detached.push(*id),
                }
            }
        }

        if !detached.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in detached {
                if subs.remove(&id).is_some() {
                    tracing::debug!(subscription = %id, "subscriber detached, removing");
                }
            }
        }
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}
