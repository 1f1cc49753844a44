//! Core types for the message store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Highest QoS level a broker message can carry.
pub const MAX_QOS: u8 = 2;

/// Last timestamp handed out, so `Timestamp::now` never goes backwards.
static LAST_TIMESTAMP: AtomicI64 = AtomicI64::new(0);

/// Microseconds since Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current time, clamped so successive calls are non-decreasing even if
    /// the wall clock steps back.
    pub fn now() -> Self {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(0);
        let prev = LAST_TIMESTAMP.fetch_max(wall, Ordering::SeqCst);
        Timestamp(wall.max(prev))
    }

    pub fn as_micros(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message received from the broker.
///
/// Immutable once constructed. The store never inspects the topic, payload
/// or QoS level; validation belongs to whoever builds the message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    topic: String,
    payload: String,
    qos: u8,
    #[serde(rename = "timestamp")]
    received_at: Timestamp,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(topic: impl Into<String>, payload: impl Into<String>, qos: u8) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos,
            received_at: Timestamp::now(),
        }
    }

    /// Create a message from raw payload bytes, decoding them lossily.
    pub fn from_bytes(topic: impl Into<String>, payload: &[u8], qos: u8) -> Self {
        Self::new(topic, String::from_utf8_lossy(payload), qos)
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn qos(&self) -> u8 {
        self.qos
    }

    pub fn received_at(&self) -> Timestamp {
        self.received_at
    }
}

/// Store statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Messages currently held in history.
    pub retained: usize,
    /// History capacity.
    pub capacity: usize,
    /// Messages appended since the store was created.
    pub total_appended: u64,
    /// Messages pushed out of history by newer ones.
    pub evicted: u64,
    /// Registered subscriptions.
    pub subscriptions: usize,
    /// Successful per-subscriber deliveries.
    pub delivered: u64,
    /// Per-subscriber deliveries dropped because a buffer was full.
    pub dropped: u64,
}
