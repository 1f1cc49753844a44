//! Integration tests for the message store.

use msgring::{Message, Store, StoreConfig, SubscriptionConfig, DEFAULT_MAX_MESSAGES};
use std::time::{Duration, Instant};

fn payloads(messages: &[Message]) -> Vec<String> {
    messages.iter().map(|m| m.payload().to_string()).collect()
}

fn numbered(i: usize) -> Message {
    Message::new("sensor/temp", i.to_string(), 0)
}

// --- History ---

#[test]
fn test_sensor_scenario() {
    let store = Store::default();
    store.append(Message::new("sensor/temp", "21.5", 0));
    store.append(Message::new("sensor/temp", "22.1", 0));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].topic(), "sensor/temp");
    assert_eq!(snapshot[0].payload(), "22.1");
    assert_eq!(snapshot[0].qos(), 0);
    assert_eq!(snapshot[1].topic(), "sensor/temp");
    assert_eq!(snapshot[1].payload(), "21.5");
    assert_eq!(snapshot[1].qos(), 0);
}

#[test]
fn test_bounded_history() {
    let store = Store::default();
    for i in 1..=250 {
        store.append(numbered(i));
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), DEFAULT_MAX_MESSAGES);

    let expected: Vec<String> = (151..=250).rev().map(|i| i.to_string()).collect();
    assert_eq!(payloads(&snapshot), expected);
}

#[test]
fn test_fifo_eviction() {
    let store = Store::default();
    for i in 1..=100 {
        store.append(numbered(i));
    }
    assert!(store.snapshot().iter().any(|m| m.payload() == "1"));

    store.append(numbered(101));

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 100);
    assert!(snapshot.iter().all(|m| m.payload() != "1"));
    assert_eq!(snapshot[0].payload(), "101");
    assert_eq!(snapshot[99].payload(), "2");
}

#[test]
fn test_snapshot_isolation() {
    let store = Store::default();
    store.append(numbered(1));

    let before = store.snapshot();
    store.append(numbered(2));
    let after = store.snapshot();

    assert_eq!(payloads(&before), vec!["1"]);
    assert_eq!(payloads(&after), vec!["2", "1"]);
}

#[test]
fn test_timestamps_follow_insertion_order() {
    let store = Store::default();
    for i in 0..50 {
        store.append(numbered(i));
    }

    let snapshot = store.snapshot();
    for pair in snapshot.windows(2) {
        assert!(pair[0].received_at() >= pair[1].received_at());
    }
}

// --- Broadcast ---

#[test]
fn test_broadcast_only_after_subscribe() {
    let store = Store::default();
    store.append(numbered(1));

    let handle = store.subscribe();
    store.append(numbered(2));

    let received = handle.recv_timeout(Duration::from_millis(100)).unwrap();
    assert_eq!(received.payload(), "2");
    assert!(handle.try_recv().is_err());
}

#[test]
fn test_snapshot_then_subscribe() {
    let store = Store::default();
    store.append(numbered(1));
    store.append(numbered(2));

    // What a streaming client does on connect
    let initial = store.snapshot();
    let handle = store.subscribe();
    store.append(numbered(3));

    assert_eq!(payloads(&initial), vec!["2", "1"]);
    assert_eq!(handle.recv_timeout(Duration::from_millis(100)).unwrap().payload(), "3");
}

#[test]
fn test_each_subscriber_sees_append_order() {
    let store = Store::default();
    let a = store.subscribe();
    let b = store.subscribe();

    for i in 0..20 {
        store.append(numbered(i));
    }

    let expected: Vec<String> = (0..20).map(|i| i.to_string()).collect();
    for handle in [&a, &b] {
        let got: Vec<String> = (0..20)
            .map(|_| handle.try_recv().unwrap().payload().to_string())
            .collect();
        assert_eq!(got, expected);
    }
}

#[test]
fn test_non_blocking_producer() {
    let store = Store::default();
    let idle = store.subscribe_with(SubscriptionConfig::with_buffer_size(4));

    let start = Instant::now();
    for i in 0..10_000 {
        store.append(numbered(i));
    }
    assert!(start.elapsed() < Duration::from_secs(5));

    assert_eq!(store.snapshot()[0].payload(), "9999");
    assert_eq!(store.subscription_count(), 1);
    assert_eq!(idle.pending(), 4);
    assert_eq!(store.dropped_count(idle.id()), Some(10_000 - 4));
}

#[test]
fn test_slow_subscriber_does_not_starve_others() {
    let store = Store::default();
    let slow = store.subscribe_with(SubscriptionConfig::with_buffer_size(1));
    let fast = store.subscribe_with(SubscriptionConfig::with_buffer_size(1000));

    for i in 0..500 {
        store.append(numbered(i));
    }

    assert_eq!(fast.pending(), 500);
    assert_eq!(slow.pending(), 1);
    assert_eq!(slow.try_recv().unwrap().payload(), "0");

    // Slow subscriber picks up again once it has room
    store.append(numbered(500));
    assert_eq!(slow.try_recv().unwrap().payload(), "500");
}

// --- Subscription lifecycle ---

#[test]
fn test_idempotent_unsubscribe() {
    let store = Store::default();
    let a = store.subscribe();
    let b = store.subscribe();

    store.unsubscribe(a.id());
    store.unsubscribe(a.id());

    store.append(numbered(1));
    assert_eq!(store.subscription_count(), 1);
    assert_eq!(b.recv_timeout(Duration::from_millis(100)).unwrap().payload(), "1");
}

#[test]
fn test_detached_subscriber_is_pruned() {
    let store = Store::default();
    let handle = store.subscribe();
    let id = handle.id();
    drop(handle);

    store.append(numbered(1));
    assert_eq!(store.subscription_count(), 0);

    // Unsubscribing after the prune is still fine
    store.unsubscribe(id);
    assert_eq!(store.subscription_count(), 0);
}

#[test]
fn test_stats() {
    let store = Store::new(StoreConfig {
        max_messages: 10,
        subscriber_buffer: 5,
    })
    .unwrap();
    let handle = store.subscribe();

    for i in 0..12 {
        store.append(numbered(i));
    }

    let stats = store.stats();
    assert_eq!(stats.retained, 10);
    assert_eq!(stats.capacity, 10);
    assert_eq!(stats.total_appended, 12);
    assert_eq!(stats.evicted, 2);
    assert_eq!(stats.subscriptions, 1);
    assert_eq!(stats.delivered, 5);
    assert_eq!(stats.dropped, 7);
    assert_eq!(handle.pending(), 5);
}
