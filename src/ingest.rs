//! Turning inbound broker messages into stored messages.

use crate::error::{Result, StoreError};
use crate::store::Store;
use crate::types::{Message, MAX_QOS};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Validates raw broker messages and appends them to a store.
///
/// The broker adapter calls `receive` for each inbound message and acks on
/// `Ok`, nacks on `Err`. The store itself never learns about acknowledgment.
pub struct Ingestor {
    store: Arc<Store>,
    accepted: AtomicU64,
    rejected: AtomicU64,
}

impl Ingestor {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    /// Validate, build and append one inbound message.
    ///
    /// The payload is decoded as UTF-8, replacing invalid sequences.
    pub fn receive(&self, topic: &str, payload: &[u8], qos: u8) -> Result<Message> {
        if let Err(e) = validate(topic, qos) {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(topic = %topic, qos, error = %e, "rejecting inbound message");
            return Err(e);
        }

        let message = Message::from_bytes(topic, payload, qos);
        tracing::info!(
            topic = %message.topic(),
            qos,
            payload = %message.payload(),
            "received message"
        );

        self.store.append(message.clone());
        self.accepted.fetch_add(1, Ordering::Relaxed);
        Ok(message)
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Messages appended so far.
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Messages refused so far.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

fn validate(topic: &str, qos: u8) -> Result<()> {
    if topic.is_empty() {
        return Err(StoreError::EmptyTopic);
    }
    if qos > MAX_QOS {
        return Err(StoreError::InvalidQos(qos));
    }
    Ok(())
}
