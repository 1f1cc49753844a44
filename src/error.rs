//! Error types for the message store.

use thiserror::Error;

/// Main error type for store and collaborator operations.
///
/// The core store operations (`append`, `snapshot`, `subscribe`,
/// `unsubscribe`) never fail; these variants come from configuration and
/// from the ingestion and delivery helpers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Message topic is empty")]
    EmptyTopic,

    #[error("Invalid QoS level: {0} (expected 0, 1 or 2)")]
    InvalidQos(u8),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
