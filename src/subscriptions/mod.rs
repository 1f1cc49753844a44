//! Subscription system for live message delivery.
//!
//! Every appended message is offered to each registered subscriber through
//! its own bounded channel:
//! - Delivery never blocks the producer
//! - A full subscriber loses the message, other subscribers are unaffected
//! - Each subscriber sees the messages it receives in append order
//!
//! # Example
//!
//! ```ignore
//! let manager = SubscriptionManager::new();
//! let handle = manager.subscribe(SubscriptionConfig::default());
//!
//! for message in &handle {
//!     println!("{}: {}", message.topic(), message.payload());
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{SubscriptionConfig, SubscriptionHandle, SubscriptionId, DEFAULT_BUFFER_SIZE};
