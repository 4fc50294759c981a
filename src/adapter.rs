//! Command Adapter
//!
//! The protocol state machine that owns the connection: it serializes
//! commands onto the wire, collects reply lines until the status line,
//! applies the error-raising policy, and (on non-blocking transports)
//! waits for asynchronous notifications.
//!
//! ## States
//!
//! ```text
//! Disconnected -> Connected(idle) -> AwaitingReply -> Connected(idle)
//!                       |
//!                       +-> WaitingForEvent   (non-blocking transports only)
//! ```
//!
//! All traffic is strictly sequential on one socket; one adapter instance
//! belongs to one caller at a time. Callers sharing a connection must
//! serialize access themselves.

use std::sync::Arc;
use std::time::SystemTime;

use crate::config::Config;
use crate::dispatch::{signals, EventDispatcher, Notification};
use crate::error::{QueryError, Result};
use crate::protocol::{Command, Event, Reply, Value, ERROR, READY, SEPARATOR_CELL};
use crate::transport::{TcpTransport, Transport};

/// Verbs rejected without contacting the server
const BLOCKED_COMMANDS: &[&str] = &["help"];

/// ServerQuery connection adapter
///
/// Owns its transport exclusively. Dropping the adapter sends a best-effort
/// `quit` and absorbs any error from that goodbye exchange.
pub struct QueryAdapter<T: Transport = TcpTransport> {
    transport: T,
    dispatcher: Arc<EventDispatcher>,
    count: u64,
    last_command: Option<SystemTime>,
}

impl QueryAdapter<TcpTransport> {
    /// Connect over TCP and perform the initial handshake
    pub fn connect(config: Config, dispatcher: Arc<EventDispatcher>) -> Result<Self> {
        let transport = TcpTransport::new(config, Arc::clone(&dispatcher));
        Self::handshake(transport, dispatcher)
    }
}

impl<T: Transport> QueryAdapter<T> {
    /// Take ownership of a connected (or connectable) transport and perform
    /// the initial handshake
    ///
    /// The first line from the server must start with the ready marker.
    /// On any handshake failure the socket is released before returning;
    /// the connection is unusable.
    pub fn handshake(mut transport: T, dispatcher: Arc<EventDispatcher>) -> Result<Self> {
        transport.connect()?;

        let greeting = match transport.read_line() {
            Ok(line) => line,
            Err(e) => {
                transport.disconnect();
                return Err(e);
            }
        };

        if !greeting.starts_with(READY) {
            transport.disconnect();
            return Err(QueryError::Framing(
                "invalid reply from the server".to_string(),
            ));
        }

        tracing::debug!("handshake accepted: {}", greeting);
        dispatcher.emit(signals::CONNECTED, &Notification::Connected);

        Ok(Self {
            transport,
            dispatcher,
            count: 0,
            last_command: None,
        })
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// Send a prepared command and return its reply
    ///
    /// A nonzero server error id raises [`QueryError::ServerQuery`]; use
    /// [`request_unchecked`](Self::request_unchecked) to inspect the reply's
    /// error record instead.
    pub fn request(&mut self, cmd: &str) -> Result<Reply> {
        self.request_inner(cmd, true)
    }

    /// Send a prepared command without raising on server errors
    ///
    /// Transport and framing failures still propagate; only the
    /// application-level error check is suppressed.
    pub fn request_unchecked(&mut self, cmd: &str) -> Result<Reply> {
        self.request_inner(cmd, false)
    }

    /// Render a [`Command`] and send it
    pub fn send_command(&mut self, command: &Command) -> Result<Reply> {
        self.request(&command.render())
    }

    /// Render a command into its wire format without sending it
    ///
    /// Pure; touches neither the transport nor the counters.
    pub fn prepare(&self, command: &Command) -> String {
        command.render()
    }

    fn request_inner(&mut self, cmd: &str, check: bool) -> Result<Reply> {
        let verb = cmd.split(SEPARATOR_CELL).next().unwrap_or_default();

        // Raw line breaks would desynchronize the framing; reject before
        // any I/O happens.
        if cmd.contains('\r') || cmd.contains('\n') {
            return Err(QueryError::Framing(format!(
                "illegal characters in command '{}'",
                verb
            )));
        }

        if BLOCKED_COMMANDS.contains(&verb) {
            return Err(QueryError::server(
                QueryError::ID_COMMAND_NOT_FOUND,
                "command not found",
            ));
        }

        self.dispatcher.emit(
            signals::COMMAND_STARTED,
            &Notification::CommandStarted {
                command: cmd.to_string(),
            },
        );
        tracing::trace!("-> {}", cmd);

        self.transport.send_line(cmd.as_bytes())?;
        self.last_command = Some(SystemTime::now());
        self.count += 1;

        // Collect lines until the status line terminates the reply.
        let mut lines = Vec::new();
        loop {
            let line = self.transport.read_line()?;
            let is_status = line.split(SEPARATOR_CELL).next() == Some(ERROR);
            lines.push(line);

            if is_status {
                break;
            }
        }

        let reply = Reply::parse(lines, cmd)?;

        for event in reply.events() {
            self.publish_event(event);
        }

        self.dispatcher.emit(
            signals::REPLY_ERROR,
            &Notification::ReplyError {
                id: reply.error_id(),
                msg: reply.error_msg(),
            },
        );
        self.dispatcher.emit(
            signals::COMMAND_FINISHED,
            &Notification::CommandFinished {
                command: cmd.to_string(),
                error_id: reply.error_id(),
            },
        );

        if check && !reply.is_ok() {
            return Err(self.compose_server_error(&reply, verb));
        }

        Ok(reply)
    }

    /// Build the raised error for a failed reply
    ///
    /// Prefers the status line's `extra_msg` detail; otherwise a
    /// `failed_permid` is resolved to the permission's symbolic name via a
    /// best-effort lookup, with the raw verb/permid/hex fallback when the
    /// lookup yields nothing.
    fn compose_server_error(&mut self, reply: &Reply, verb: &str) -> QueryError {
        let mut msg = reply.error_msg();

        if let Some(extra) = reply.error_property("extra_msg") {
            let detail = extra.to_string();
            let detail = detail.trim();
            if !detail.is_empty() {
                msg.push_str(&format!(" ({})", detail));
            }
        } else if let Some(permid) = reply.error_property("failed_permid").and_then(Value::as_int)
        {
            match self.lookup_permission_name(permid) {
                Some(permsid) => msg.push_str(&format!(" (failed on {})", permsid)),
                None => {
                    msg.push_str(&format!(" (failed on {} {}/0x{:X})", verb, permid, permid))
                }
            }
        }

        QueryError::server(reply.error_id(), msg)
    }

    /// Fallible lookup of a permission's symbolic name
    fn lookup_permission_name(&mut self, permid: i64) -> Option<String> {
        let reply = self
            .request_unchecked(&format!("permget permid={}", permid))
            .ok()?;

        if !reply.is_ok() {
            return None;
        }

        reply
            .to_array()
            .first()
            .and_then(|row| row.get("permsid").cloned())
            .map(|value| value.to_string())
    }

    // =========================================================================
    // Event waiting
    // =========================================================================

    /// Block until the server pushes a notification and return it
    ///
    /// Only valid on a non-blocking transport; calling this on a blocking
    /// transport is a caller configuration error, rejected before any I/O.
    pub fn wait(&mut self) -> Result<Event> {
        if self.transport.is_blocking() {
            return Err(QueryError::Framing(
                "wait() is only available in non-blocking mode".to_string(),
            ));
        }

        loop {
            let line = self.transport.read_line()?;

            if Event::is_event_line(&line) {
                let event = Event::parse(&line)?;
                self.publish_event(&event);
                return Ok(event);
            }
        }
    }

    /// Dual dispatch: the generic event signal plus the type-specific one
    fn publish_event(&self, event: &Event) {
        let notification = Notification::Event {
            event: event.clone(),
        };

        self.dispatcher.emit(signals::EVENT, &notification);
        self.dispatcher.emit(&event.notify_name(), &notification);
    }

    // =========================================================================
    // Lifecycle and diagnostics
    // =========================================================================

    /// Release the connection without the goodbye exchange
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Number of commands sent on this connection
    pub fn command_count(&self) -> u64 {
        self.count
    }

    /// Wall-clock time of the last command sent
    pub fn last_command_at(&self) -> Option<SystemTime> {
        self.last_command
    }

    /// The dispatcher this adapter publishes to
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }
}

impl<T: Transport> Drop for QueryAdapter<T> {
    fn drop(&mut self) {
        if self.transport.is_connected() {
            // Best-effort goodbye; a failed quit is not an error.
            if let Err(e) = self.request_inner("quit", false) {
                tracing::debug!("quit on teardown failed: {}", e);
            }
            self.transport.disconnect();
        }
    }
}
