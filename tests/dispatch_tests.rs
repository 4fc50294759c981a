//! Event Dispatcher Tests
//!
//! Tests for subscription tokens, delivery, and re-entrant callbacks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tsquery::dispatch::signals;
use tsquery::{EventDispatcher, Notification};

// =============================================================================
// Delivery Tests
// =============================================================================

#[test]
fn test_subscribe_and_emit() {
    let dispatcher = EventDispatcher::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let hits_clone = Arc::clone(&hits);
    dispatcher.subscribe(signals::CONNECTED, move |_| {
        hits_clone.fetch_add(1, Ordering::SeqCst);
    });

    dispatcher.emit(signals::CONNECTED, &Notification::Connected);
    dispatcher.emit(signals::CONNECTED, &Notification::Connected);

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_payload_reaches_callback() {
    let dispatcher = EventDispatcher::new();
    let seen = Arc::new(parking_lot::Mutex::new(String::new()));

    let seen_clone = Arc::clone(&seen);
    dispatcher.subscribe(signals::COMMAND_STARTED, move |n| {
        if let Notification::CommandStarted { command } = n {
            *seen_clone.lock() = command.clone();
        }
    });

    dispatcher.emit(
        signals::COMMAND_STARTED,
        &Notification::CommandStarted {
            command: "whoami".to_string(),
        },
    );

    assert_eq!(*seen.lock(), "whoami");
}

#[test]
fn test_signals_are_independent() {
    let dispatcher = EventDispatcher::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let hits_clone = Arc::clone(&hits);
    dispatcher.subscribe(signals::DATA_READ, move |_| {
        hits_clone.fetch_add(1, Ordering::SeqCst);
    });

    dispatcher.emit(signals::DATA_SENT, &Notification::DataSent { bytes: vec![] });

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_emit_without_subscribers_is_noop() {
    let dispatcher = EventDispatcher::new();
    dispatcher.emit(signals::DISCONNECTED, &Notification::Disconnected);
}

#[test]
fn test_multiple_subscribers_all_fire() {
    let dispatcher = EventDispatcher::new();
    let hits = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let hits_clone = Arc::clone(&hits);
        dispatcher.subscribe(signals::EVENT, move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
    }

    dispatcher.emit(signals::EVENT, &Notification::Disconnected);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

// =============================================================================
// Subscription Token Tests
// =============================================================================

#[test]
fn test_unsubscribe_stops_delivery() {
    let dispatcher = EventDispatcher::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let hits_clone = Arc::clone(&hits);
    let token = dispatcher.subscribe(signals::CONNECTED, move |_| {
        hits_clone.fetch_add(1, Ordering::SeqCst);
    });

    dispatcher.emit(signals::CONNECTED, &Notification::Connected);
    assert!(dispatcher.unsubscribe(token));
    dispatcher.emit(signals::CONNECTED, &Notification::Connected);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unsubscribe_twice_returns_false() {
    let dispatcher = EventDispatcher::new();
    let token = dispatcher.subscribe(signals::CONNECTED, |_| {});

    assert!(dispatcher.unsubscribe(token));
    assert!(!dispatcher.unsubscribe(token));
}

#[test]
fn test_tokens_are_per_subscription() {
    let dispatcher = EventDispatcher::new();
    let hits = Arc::new(AtomicUsize::new(0));

    let hits_a = Arc::clone(&hits);
    let token_a = dispatcher.subscribe(signals::CONNECTED, move |_| {
        hits_a.fetch_add(1, Ordering::SeqCst);
    });
    let hits_b = Arc::clone(&hits);
    let _token_b = dispatcher.subscribe(signals::CONNECTED, move |_| {
        hits_b.fetch_add(1, Ordering::SeqCst);
    });

    dispatcher.unsubscribe(token_a);
    dispatcher.emit(signals::CONNECTED, &Notification::Connected);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_has_handlers_and_count() {
    let dispatcher = EventDispatcher::new();
    assert!(!dispatcher.has_handlers(signals::EVENT));

    let token = dispatcher.subscribe(signals::EVENT, |_| {});
    dispatcher.subscribe(signals::EVENT, |_| {});

    assert!(dispatcher.has_handlers(signals::EVENT));
    assert_eq!(dispatcher.handler_count(signals::EVENT), 2);

    dispatcher.unsubscribe(token);
    assert_eq!(dispatcher.handler_count(signals::EVENT), 1);
}

// =============================================================================
// Re-entrancy Tests
// =============================================================================

#[test]
fn test_callback_may_subscribe_during_emit() {
    let dispatcher = Arc::new(EventDispatcher::new());

    let dispatcher_clone = Arc::clone(&dispatcher);
    dispatcher.subscribe(signals::CONNECTED, move |_| {
        dispatcher_clone.subscribe(signals::DISCONNECTED, |_| {});
    });

    dispatcher.emit(signals::CONNECTED, &Notification::Connected);
    assert!(dispatcher.has_handlers(signals::DISCONNECTED));
}
