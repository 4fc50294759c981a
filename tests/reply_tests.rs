//! Reply Parser Tests
//!
//! Tests for status-line parsing, body classification, and the body views.

use tsquery::{QueryError, Reply, ReplyList, Value};

fn parse(lines: &[&str]) -> Reply {
    Reply::parse(lines.iter().map(|s| s.to_string()).collect(), "test").unwrap()
}

// =============================================================================
// Status Line Tests
// =============================================================================

#[test]
fn test_success_status_line() {
    let reply = parse(&["error id=0 msg=ok"]);

    assert!(reply.is_ok());
    assert_eq!(reply.error_id(), 0);
    assert_eq!(reply.error_msg(), "ok");
}

#[test]
fn test_error_message_is_unescaped() {
    let reply = parse(&["error id=256 msg=command\\snot\\sfound"]);

    assert_eq!(reply.error_id(), 256);
    assert_eq!(reply.error_msg(), "command not found");
}

#[test]
fn test_status_line_extra_fields() {
    let reply = parse(&["error id=1538 msg=parameter\\snot\\sfound extra_msg=bad\\svalue"]);

    assert_eq!(reply.error_id(), 1538);
    assert_eq!(
        reply.error_property("extra_msg"),
        Some(&Value::Text("bad value".to_string()))
    );
}

#[test]
fn test_status_line_integer_coercion() {
    let reply = parse(&["error id=2568 msg=insufficient\\spermissions failed_permid=4"]);

    assert_eq!(
        reply.error_property("failed_permid"),
        Some(&Value::Int(4))
    );
}

#[test]
fn test_missing_status_line_is_framing_error() {
    let result = Reply::parse(Vec::new(), "test");
    assert!(matches!(result, Err(QueryError::Framing(_))));
}

#[test]
fn test_malformed_status_line_is_framing_error() {
    let result = Reply::parse(vec!["a=1 b=2".to_string()], "test");
    assert!(matches!(result, Err(QueryError::Framing(_))));
}

// =============================================================================
// Body Classification Tests
// =============================================================================

#[test]
fn test_greeting_lines_discarded() {
    let reply = parse(&[
        "Welcome to the TeamSpeak 3 ServerQuery interface",
        "a=1",
        "error id=0 msg=ok",
    ]);

    assert_eq!(reply.raw(), "a=1");
    assert!(reply.events().is_empty());
}

#[test]
fn test_interleaved_event_extracted() {
    let reply = parse(&[
        "notifyTextmessage target=3 msg=hi",
        "a=1",
        "error id=0 msg=ok",
    ]);

    assert_eq!(reply.events().len(), 1);
    assert_eq!(reply.events()[0].event_type(), "Textmessage");

    let rows = reply.to_array();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("a"), Some(&Value::Int(1)));
}

#[test]
fn test_body_rows_joined_by_list_separator() {
    let reply = parse(&["a=1", "b=2", "error id=0 msg=ok"]);
    assert_eq!(reply.raw(), "a=1|b=2");
}

// =============================================================================
// View Tests
// =============================================================================

#[test]
fn test_to_lines_unescapes() {
    let reply = parse(&["name=John\\sDoe|name=Jane", "error id=0 msg=ok"]);
    assert_eq!(reply.to_lines(), vec!["name=John Doe", "name=Jane"]);
}

#[test]
fn test_to_lines_empty_body() {
    let reply = parse(&["error id=0 msg=ok"]);
    assert!(reply.to_lines().is_empty());
    assert!(reply.to_array().is_empty());
}

#[test]
fn test_to_table_splits_cells() {
    let reply = parse(&["clid=1 cid=2|clid=3 cid=4", "error id=0 msg=ok"]);

    let table = reply.to_table();
    assert_eq!(table.len(), 2);
    assert_eq!(table[0], vec!["clid=1", "cid=2"]);
    assert_eq!(table[1], vec!["clid=3", "cid=4"]);
}

#[test]
fn test_to_array_types_and_unescaping() {
    let reply = parse(&["a=1 b=hello c=two\\swords", "error id=0 msg=ok"]);

    let rows = reply.to_array();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("a"), Some(&Value::Int(1)));
    assert_eq!(rows[0].get("b"), Some(&Value::Text("hello".to_string())));
    assert_eq!(rows[0].get("c"), Some(&Value::Text("two words".to_string())));
}

#[test]
fn test_to_array_flag_cell_is_null() {
    let reply = parse(&["clid=1 -uid", "error id=0 msg=ok"]);

    let rows = reply.to_array();
    assert_eq!(rows[0].get("-uid"), Some(&Value::Null));
}

#[test]
fn test_to_array_raw_keeps_escaped_text() {
    let reply = parse(&["c=two\\swords", "error id=0 msg=ok"]);

    let rows = reply.to_array_raw();
    assert_eq!(
        rows[0].get("c"),
        Some(&Value::Text("two\\swords".to_string()))
    );
}

#[test]
fn test_to_assoc_array_reindexes_by_field() {
    let reply = parse(&[
        "clid=1 client_nickname=alice|clid=2 client_nickname=bob",
        "error id=0 msg=ok",
    ]);

    let indexed = reply.to_assoc_array("clid").unwrap();
    assert_eq!(indexed.len(), 2);
    assert_eq!(indexed[0].0, "1");
    assert_eq!(
        indexed[1].1.get("client_nickname"),
        Some(&Value::Text("bob".to_string()))
    );
}

#[test]
fn test_to_assoc_array_missing_field_fails() {
    let reply = parse(&["clid=1|cid=7", "error id=0 msg=ok"]);

    let err = reply.to_assoc_array("clid").unwrap_err();
    assert_eq!(err.server_error_id(), Some(0x602));
}

// =============================================================================
// Singleton Collapse Tests
// =============================================================================

#[test]
fn test_to_list_collapses_single_row() {
    let reply = parse(&["a=1 b=hello", "error id=0 msg=ok"]);

    match reply.to_list() {
        ReplyList::Single(row) => {
            assert_eq!(row.get_int("a").unwrap(), 1);
            assert_eq!(row.get_str("b").unwrap(), "hello");
        }
        ReplyList::Many(_) => panic!("expected singleton collapse"),
    }
}

#[test]
fn test_to_list_keeps_multiple_rows() {
    let reply = parse(&["a=1|a=2", "error id=0 msg=ok"]);

    match reply.to_list() {
        ReplyList::Many(rows) => assert_eq!(rows.len(), 2),
        ReplyList::Single(_) => panic!("expected many rows"),
    }
}

#[test]
fn test_to_list_empty_body_is_many() {
    let reply = parse(&["error id=0 msg=ok"]);
    assert_eq!(reply.to_list(), ReplyList::Many(Vec::new()));
}

#[test]
fn test_into_rows_uniform_shape() {
    let reply = parse(&["a=1", "error id=0 msg=ok"]);
    assert_eq!(reply.to_list().into_rows().len(), 1);
}

// =============================================================================
// Typed Row Accessor Tests
// =============================================================================

#[test]
fn test_row_unknown_key_is_invalid_parameter() {
    let reply = parse(&["a=1", "error id=0 msg=ok"]);
    let rows = reply.to_array();

    let err = rows[0].get_str("nope").unwrap_err();
    assert_eq!(err.server_error_id(), Some(0x602));
}

#[test]
fn test_row_get_str_renders_integers() {
    let reply = parse(&["a=42", "error id=0 msg=ok"]);
    let rows = reply.to_array();

    assert_eq!(rows[0].get_str("a").unwrap(), "42");
}

#[test]
fn test_row_get_int_rejects_text() {
    let reply = parse(&["a=hello", "error id=0 msg=ok"]);
    let rows = reply.to_array();

    assert!(rows[0].get_int("a").is_err());
}
