//! Event parsing
//!
//! An event is an asynchronous push notification not tied to a request:
//! `notify<Type> key=value [key=value ...]`. Events appear interleaved with
//! reply data lines or standalone when polled via the adapter's `wait()`.

use crate::error::{QueryError, Result};
use crate::protocol::row::{decode_row, Row};
use crate::protocol::{EVENT, SEPARATOR_CELL};

/// A parsed server notification
#[derive(Debug, Clone)]
pub struct Event {
    event_type: String,
    data: Row,
    message: String,
}

impl Event {
    /// Returns true if the line carries the event prefix
    pub fn is_event_line(line: &str) -> bool {
        line.split(SEPARATOR_CELL)
            .next()
            .is_some_and(|cell| cell.starts_with(EVENT))
    }

    /// Parse a single notification line
    ///
    /// The line must start with the event prefix and carry at least one
    /// key/value pair after the type tag.
    pub fn parse(line: &str) -> Result<Self> {
        if !line.starts_with(EVENT) {
            return Err(QueryError::Framing(
                "invalid notification event format".to_string(),
            ));
        }

        let (tag, payload) = line
            .split_once(SEPARATOR_CELL)
            .ok_or_else(|| QueryError::Framing("invalid notification event data".to_string()))?;

        if payload.is_empty() {
            return Err(QueryError::Framing(
                "invalid notification event data".to_string(),
            ));
        }

        // Same single-row decoding the reply views use.
        let data = decode_row(payload.split(SEPARATOR_CELL), true);
        if data.is_empty() {
            return Err(QueryError::Framing(
                "invalid notification event data".to_string(),
            ));
        }

        Ok(Self {
            event_type: tag[EVENT.len()..].to_string(),
            data,
            message: payload.to_string(),
        })
    }

    /// The event type with the notify prefix stripped (e.g. `Textmessage`)
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The full wire tag (e.g. `notifyTextmessage`), used as the
    /// type-specific dispatch signal
    pub fn notify_name(&self) -> String {
        format!("{}{}", EVENT, self.event_type)
    }

    /// The parsed key/value payload
    pub fn data(&self) -> &Row {
        &self.data
    }

    /// The payload as the unparsed wire string
    pub fn message(&self) -> &str {
        &self.message
    }
}
