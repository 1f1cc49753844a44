//! Main Store struct tying history and subscriptions together.

use crate::error::{Result, StoreError};
use crate::history::HistoryBuffer;
use crate::subscriptions::{
    SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
    DEFAULT_BUFFER_SIZE,
};
use crate::types::{Message, StoreStats};
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Default number of messages kept in history.
pub const DEFAULT_MAX_MESSAGES: usize = 100;

/// Store configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Size of the retained history.
    #[serde(alias = "max_messages")]
    pub max_messages: usize,

    /// Per-subscriber buffer used by `Store::subscribe`.
    #[serde(alias = "subscriber_buffer")]
    pub subscriber_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            subscriber_buffer: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl StoreConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StoreConfig = serde_json::from_str(json)
            .map_err(|e| StoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_messages == 0 {
            return Err(StoreError::InvalidConfig(
                "maxMessages must be greater than zero".into(),
            ));
        }
        if self.subscriber_buffer == 0 {
            return Err(StoreError::InvalidConfig(
                "subscriberBuffer must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Bounded in-memory message store with live fan-out.
///
/// Construct once and share it as `Arc<Store>` between whatever ingests
/// messages and whatever serves them.
///
/// - `append` never waits on subscribers
/// - `snapshot` returns a detached copy, newest first
/// - `subscribe` yields only messages appended afterwards
pub struct Store {
    config: StoreConfig,

    /// Recent messages, newest first.
    history: RwLock<HistoryBuffer>,

    /// Live subscribers.
    subscriptions: SubscriptionManager,

    /// Serializes appends so history order and delivery order agree.
    write_lock: Mutex<()>,

    appended: AtomicU64,
    evicted: AtomicU64,
}

impl Store {
    /// Create a store from a validated configuration.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        Self {
            history: RwLock::new(HistoryBuffer::new(config.max_messages)),
            subscriptions: SubscriptionManager::new(),
            write_lock: Mutex::new(()),
            appended: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // --- Message Operations ---

    /// Append a message to history and offer it to every subscriber.
    ///
    /// Once this returns, `snapshot` on any thread includes the message.
    pub fn append(&self, message: Message) {
        let _lock = self.write_lock.lock();

        let evicted = self.history.write().push(message.clone());
        self.appended.fetch_add(1, Ordering::Relaxed);
        if let Some(old) = evicted {
            self.evicted.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(topic = %old.topic(), "evicted oldest message");
        }

        self.subscriptions.broadcast(&message);
    }

    /// Copy of the retained history, newest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.history.read().snapshot()
    }

    /// Most recently appended message still in history.
    pub fn latest(&self) -> Option<Message> {
        self.history.read().latest().cloned()
    }

    /// Number of messages currently retained.
    pub fn len(&self) -> usize {
        self.history.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.read().is_empty()
    }

    // --- Subscription Operations ---

    /// Subscribe to messages appended from now on.
    ///
    /// There is no replay: call `snapshot` first for history, accepting that
    /// a message appended between the two calls may be missed or seen twice.
    pub fn subscribe(&self) -> SubscriptionHandle {
        self.subscribe_with(SubscriptionConfig::with_buffer_size(
            self.config.subscriber_buffer,
        ))
    }

    /// Subscribe with a custom buffer size.
    pub fn subscribe_with(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.subscriptions.subscribe(config)
    }

    /// Remove a subscription. Unknown or already removed ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }

    /// Messages dropped for one subscription because its buffer was full.
    pub fn dropped_count(&self, id: SubscriptionId) -> Option<u64> {
        self.subscriptions.dropped_count(id)
    }

    // --- Utility ---

    /// Get store statistics.
    pub fn stats(&self) -> StoreStats {
        let (retained, capacity) = {
            let history = self.history.read();
            (history.len(), history.capacity())
        };

        StoreStats {
            retained,
            capacity,
            total_appended: self.appended.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            subscriptions: self.subscriptions.subscription_count(),
            delivered: self.subscriptions.total_delivered(),
            dropped: self.subscriptions.total_dropped(),
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::build(StoreConfig::default())
    }
}
