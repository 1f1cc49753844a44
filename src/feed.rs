//! Encoding history and live messages for HTTP delivery.
//!
//! The HTTP layer serves `snapshot_json` as the recent-messages endpoint and
//! streams `LiveFeed` events as server-sent events, one JSON object each.

use crate::error::Result;
use crate::store::Store;
use crate::subscriptions::{SubscriptionHandle, SubscriptionId};
use crate::types::Message;
use crossbeam_channel::RecvTimeoutError;
use std::sync::Arc;
use std::time::Duration;

/// Current history as a JSON array, newest first.
pub fn snapshot_json(store: &Store) -> Result<String> {
    Ok(serde_json::to_string(&store.snapshot())?)
}

/// Frame one message as a server-sent event.
pub fn sse_event(message: &Message) -> Result<String> {
    let json = serde_json::to_string(message)?;
    Ok(format!("data: {}\n\n", json))
}

/// What a live feed produced while polling.
#[derive(Debug)]
pub enum FeedEvent {
    /// A message, already framed as a server-sent event.
    Message(String),
    /// Nothing arrived before the timeout; the client is still attached.
    Idle,
    /// The subscription was removed; stop streaming.
    Closed,
}

/// A subscription owned by one streaming client.
///
/// Unsubscribes when dropped, so a disconnected client never lingers in the
/// store's subscriber set.
pub struct LiveFeed {
    store: Arc<Store>,
    handle: SubscriptionHandle,
}

impl LiveFeed {
    /// Subscribe to the store with its default buffer size.
    pub fn open(store: Arc<Store>) -> Self {
        let handle = store.subscribe();
        tracing::debug!(subscription = %handle.id(), "live feed opened");
        Self { store, handle }
    }

    pub fn id(&self) -> SubscriptionId {
        self.handle.id()
    }

    /// Wait up to `timeout` for the next message and frame it.
    pub fn next_event(&self, timeout: Duration) -> Result<FeedEvent> {
        match self.handle.recv_timeout(timeout) {
            Ok(message) => Ok(FeedEvent::Message(sse_event(&message)?)),
            Err(RecvTimeoutError::Timeout) => Ok(FeedEvent::Idle),
            Err(RecvTimeoutError::Disconnected) => Ok(FeedEvent::Closed),
        }
    }

    /// Wait for the next raw message. `None` once the feed is closed.
    pub fn next_message(&self) -> Option<Message> {
        self.handle.recv().ok()
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.store.unsubscribe(self.handle.id());
        tracing::debug!(subscription = %self.handle.id(), "live feed closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_json_newest_first() {
        let store = Store::default();
        store.append(Message::new("sensor/temp", "21.5", 0));
        store.append(Message::new("sensor/temp", "22.1", 0));

        let json = snapshot_json(&store).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["payload"], "22.1");
        assert_eq!(items[1]["payload"], "21.5");
        assert_eq!(items[0]["qos"], 0);
    }

    #[test]
    fn test_empty_snapshot_json() {
        assert_eq!(snapshot_json(&Store::default()).unwrap(), "[]");
    }

    #[test]
    fn test_sse_framing() {
        let message = Message::new("a/b", "hi", 2);
        let event = sse_event(&message).unwrap();

        assert!(event.starts_with("data: {"));
        assert!(event.ends_with("}\n\n"));
        let body = event.trim_start_matches("data: ").trim_end();
        let decoded: Message = serde_json::from_str(body).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_live_feed_events() {
        let store = Arc::new(Store::default());
        let feed = LiveFeed::open(Arc::clone(&store));

        assert!(matches!(
            feed.next_event(Duration::from_millis(10)).unwrap(),
            FeedEvent::Idle
        ));

        store.append(Message::new("t", "x", 0));
        match feed.next_event(Duration::from_millis(100)).unwrap() {
            FeedEvent::Message(frame) => assert!(frame.contains("\"payload\":\"x\"")),
            other => panic!("Expected message event, got {:?}", other),
        }

        store.unsubscribe(feed.id());
        assert!(matches!(
            feed.next_event(Duration::from_millis(10)).unwrap(),
            FeedEvent::Closed
        ));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = Arc::new(Store::default());
        let feed = LiveFeed::open(Arc::clone(&store));
        assert_eq!(store.subscription_count(), 1);

        drop(feed);
        assert_eq!(store.subscription_count(), 0);
    }

    #[test]
    fn test_next_message_until_closed() {
        let store = Arc::new(Store::default());
        let feed = LiveFeed::open(Arc::clone(&store));

        store.append(Message::new("t", "x", 1));
        store.unsubscribe(feed.id());

        assert_eq!(feed.next_message().unwrap().payload(), "x");
        assert!(feed.next_message().is_none());
    }
}
