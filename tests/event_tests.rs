//! Event Parser Tests
//!
//! Tests for notification line validation and payload decoding.

use tsquery::{Event, QueryError, Value};

// =============================================================================
// Parsing Tests
// =============================================================================

#[test]
fn test_parse_textmessage_event() {
    let event = Event::parse("notifyTextmessage targetmode=1 msg=hello\\sworld invokerid=5")
        .unwrap();

    assert_eq!(event.event_type(), "Textmessage");
    assert_eq!(event.notify_name(), "notifyTextmessage");
    assert_eq!(
        event.data().get("msg"),
        Some(&Value::Text("hello world".to_string()))
    );
    assert_eq!(event.data().get("invokerid"), Some(&Value::Int(5)));
}

#[test]
fn test_message_keeps_unparsed_payload() {
    let event = Event::parse("notifyClientmoved clid=3 ctid=12").unwrap();
    assert_eq!(event.message(), "clid=3 ctid=12");
}

#[test]
fn test_payload_integer_coercion() {
    let event = Event::parse("notifyClientmoved clid=3 ctid=12 reasonid=0").unwrap();

    assert_eq!(event.data().get_int("clid").unwrap(), 3);
    assert_eq!(event.data().get_int("ctid").unwrap(), 12);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_wrong_prefix_rejected() {
    let result = Event::parse("error id=0 msg=ok");
    assert!(matches!(result, Err(QueryError::Framing(_))));
}

#[test]
fn test_missing_payload_rejected() {
    let result = Event::parse("notifycliententerview");
    assert!(matches!(result, Err(QueryError::Framing(_))));
}

#[test]
fn test_empty_payload_rejected() {
    let result = Event::parse("notifycliententerview ");
    assert!(matches!(result, Err(QueryError::Framing(_))));
}

// =============================================================================
// Classification Tests
// =============================================================================

#[test]
fn test_is_event_line() {
    assert!(Event::is_event_line("notifyTextmessage msg=hi"));
    assert!(Event::is_event_line("notifycliententerview clid=1"));
    assert!(!Event::is_event_line("error id=0 msg=ok"));
    assert!(!Event::is_event_line("clid=1 cid=2"));
    assert!(!Event::is_event_line(""));
}
