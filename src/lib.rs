//! # Message Ring
//!
//! A bounded, thread-safe store of recent broker messages with live fan-out
//! to any number of subscribers.
//!
//! ## Core Concepts
//!
//! - **History**: The most recent messages (100 by default), newest first
//! - **Snapshot**: A detached copy of the history
//! - **Subscriptions**: Bounded per-subscriber feeds of newly appended messages
//! - **Drop-on-overflow**: A full subscriber misses messages; nobody else waits
//!
//! ## Example
//!
//! ```ignore
//! use msgring::{Message, Store, StoreConfig};
//! use std::sync::Arc;
//!
//! let store = Arc::new(Store::new(StoreConfig::default())?);
//!
//! // Live feed for a streaming client
//! let handle = store.subscribe();
//!
//! store.append(Message::new("sensor/temp", "21.5", 0));
//!
//! let recent = store.snapshot();
//! let next = handle.recv()?;
//! ```

pub mod error;
pub mod feed;
pub mod history;
pub mod ingest;
pub mod store;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{Result, StoreError};
pub use feed::{snapshot_json, sse_event, FeedEvent, LiveFeed};
pub use history::HistoryBuffer;
pub use ingest::Ingestor;
pub use store::{Store, StoreConfig, DEFAULT_MAX_MESSAGES};
pub use subscriptions::{
    SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
    DEFAULT_BUFFER_SIZE,
};
pub use types::*;
