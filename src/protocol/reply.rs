//! Reply parsing
//!
//! Turns the ordered list of raw lines captured by one request into a
//! [`Reply`]: a parsed error record, the message body, and any asynchronous
//! events that arrived interleaved with the response.

use crate::error::{QueryError, Result};
use crate::protocol::escape::unescape;
use crate::protocol::event::Event;
use crate::protocol::row::{decode_row, Row, Value};
use crate::protocol::{ERROR, GREET, SEPARATOR_CELL, SEPARATOR_LIST};

/// The result of one ServerQuery request
///
/// The last line of every reply is the status line (protocol guarantee);
/// greeting lines are discarded and event lines are captured separately, so
/// the body holds only the actual answer rows.
#[derive(Debug, Clone)]
pub struct Reply {
    command: String,
    body: String,
    error: Row,
    events: Vec<Event>,
}

/// Return type of [`Reply::to_list`]
///
/// A body with exactly one row collapses to `Single`; anything else is
/// `Many`. The asymmetry is a deliberate, documented convention inherited
/// from the protocol's callers: single-object replies (`serverinfo`,
/// `whoami`) arrive without unwrapping. Use [`into_rows`](Self::into_rows)
/// when a uniform shape is wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyList {
    Single(Row),
    Many(Vec<Row>),
}

impl ReplyList {
    /// The uniform row vector, regardless of collapse
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            ReplyList::Single(row) => vec![row],
            ReplyList::Many(rows) => rows,
        }
    }

    /// The collapsed row, if the reply held exactly one
    pub fn as_single(&self) -> Option<&Row> {
        match self {
            ReplyList::Single(row) => Some(row),
            ReplyList::Many(_) => None,
        }
    }
}

impl Reply {
    /// Parse the captured reply lines
    ///
    /// The final line is parsed as the status line; remaining lines are
    /// classified as greeting (discarded), event (captured), or body.
    /// Parsing never raises for a nonzero error id; the adapter applies
    /// that policy so the caller can suppress it per request.
    pub fn parse(mut lines: Vec<String>, command: impl Into<String>) -> Result<Self> {
        let status = lines.pop().ok_or_else(|| {
            QueryError::Framing("reply ended without a status line".to_string())
        })?;
        let error = parse_status_line(&status)?;

        let mut events = Vec::new();
        let mut body_rows = Vec::new();

        for line in lines {
            if line.starts_with(GREET) {
                continue;
            }
            if Event::is_event_line(&line) {
                events.push(Event::parse(&line)?);
            } else {
                body_rows.push(line);
            }
        }

        Ok(Self {
            command: command.into(),
            body: body_rows.join(&SEPARATOR_LIST.to_string()),
            error,
            events,
        })
    }

    // =========================================================================
    // Error record
    // =========================================================================

    /// The parsed status line fields (`id`, `msg`, extra fields)
    pub fn error_row(&self) -> &Row {
        &self.error
    }

    /// The server's error id; 0 means success
    pub fn error_id(&self) -> i64 {
        self.error
            .get("id")
            .and_then(Value::as_int)
            .unwrap_or_default()
    }

    /// The server's error message
    pub fn error_msg(&self) -> String {
        self.error
            .get("msg")
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// A named field of the status line, if present
    pub fn error_property(&self, key: &str) -> Option<&Value> {
        self.error.get(key)
    }

    pub fn is_ok(&self) -> bool {
        self.error_id() == 0
    }

    // =========================================================================
    // Captured events
    // =========================================================================

    /// Events that arrived before or during this reply
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    // =========================================================================
    // Body views (computed per call from the raw body)
    // =========================================================================

    /// The raw body in wire form: escaped rows joined by the list separator
    pub fn raw(&self) -> &str {
        &self.body
    }

    /// The command that produced this reply
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The body split into unescaped row strings
    pub fn to_lines(&self) -> Vec<String> {
        if self.body.is_empty() {
            return Vec::new();
        }

        self.body
            .split(SEPARATOR_LIST)
            .map(unescape)
            .collect()
    }

    /// The body split into rows of unescaped cell strings
    pub fn to_table(&self) -> Vec<Vec<String>> {
        self.raw_rows()
            .map(|row| row.split(SEPARATOR_CELL).map(unescape).collect())
            .collect()
    }

    /// The body decoded into typed rows with unescaped values
    pub fn to_array(&self) -> Vec<Row> {
        self.decode_rows(true)
    }

    /// Like [`to_array`](Self::to_array), but text values keep their
    /// escaped wire form for callers that unescape lazily
    pub fn to_array_raw(&self) -> Vec<Row> {
        self.decode_rows(false)
    }

    /// The decoded rows reindexed by the value of `key`
    ///
    /// Fails with the protocol's "invalid parameter" error if any row
    /// lacks the field.
    pub fn to_assoc_array(&self, key: &str) -> Result<Vec<(String, Row)>> {
        let mut indexed = Vec::new();

        for row in self.to_array() {
            let index = row.require(key)?.to_string();
            indexed.push((index, row));
        }

        Ok(indexed)
    }

    /// The decoded rows, collapsing a singleton body to its only row
    pub fn to_list(&self) -> ReplyList {
        let mut rows = self.to_array();

        if rows.len() == 1 {
            ReplyList::Single(rows.remove(0))
        } else {
            ReplyList::Many(rows)
        }
    }

    fn raw_rows(&self) -> impl Iterator<Item = &str> {
        self.body
            .split(SEPARATOR_LIST)
            .filter(|row| !row.is_empty())
    }

    fn decode_rows(&self, unescape_values: bool) -> Vec<Row> {
        self.raw_rows()
            .map(|row| decode_row(row.split(SEPARATOR_CELL), unescape_values))
            .collect()
    }
}

/// Parse the `error id=<n> msg=<text> [key=value ...]` status line
fn parse_status_line(line: &str) -> Result<Row> {
    let mut cells = line.split(SEPARATOR_CELL);

    if cells.next() != Some(ERROR) {
        return Err(QueryError::Framing(format!(
            "malformed status line: '{}'",
            line
        )));
    }

    Ok(decode_row(cells, true))
}
