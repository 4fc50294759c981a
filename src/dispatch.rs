//! Event dispatcher
//!
//! An explicitly constructed signal/slot registry shared by handle between
//! the adapter, its transport, and any interested observers. Signals are
//! keyed by name; subscriptions are identified by an explicit token returned
//! at subscribe time.
//!
//! Generic observers (loggers) subscribe to the broad signals in [`signals`];
//! event-type handlers subscribe to the wire tag of the notification they
//! care about (e.g. `"notifyTextmessage"`), which the adapter emits alongside
//! the generic [`signals::EVENT`] signal for every parsed event.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::protocol::Event;

/// Well-known signal names
pub mod signals {
    /// Transport established and handshake accepted
    pub const CONNECTED: &str = "connected";

    /// Transport released (emitted once per connection)
    pub const DISCONNECTED: &str = "disconnected";

    /// A command line is about to be sent
    pub const COMMAND_STARTED: &str = "commandStarted";

    /// A full reply to a command has been read
    pub const COMMAND_FINISHED: &str = "commandFinished";

    /// Raw bytes read from the stream
    pub const DATA_READ: &str = "dataRead";

    /// Raw bytes written to the stream
    pub const DATA_SENT: &str = "dataSent";

    /// A non-blocking read waited a full timeout interval without data
    pub const WAIT_TIMEOUT: &str = "waitTimeout";

    /// An asynchronous server notification was parsed (generic; a
    /// type-specific signal named after the wire tag fires as well)
    pub const EVENT: &str = "event";

    /// A reply's status line was parsed (fires for error and success ids)
    pub const REPLY_ERROR: &str = "replyError";
}

/// Payload delivered to subscribed callbacks
#[derive(Debug, Clone)]
pub enum Notification {
    Connected,
    Disconnected,
    CommandStarted { command: String },
    CommandFinished { command: String, error_id: i64 },
    DataRead { bytes: Vec<u8> },
    DataSent { bytes: Vec<u8> },
    WaitTimeout { waited: Duration },
    Event { event: Event },
    ReplyError { id: i64, msg: String },
}

/// Token identifying one subscription, returned by [`EventDispatcher::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&Notification) + Send + Sync>;

struct Slot {
    id: u64,
    signal: String,
    callback: Callback,
}

/// Signal/slot registry
///
/// Whoever creates the top-level connection owns the dispatcher and passes
/// it to the adapter by `Arc` handle. Callbacks are invoked outside the
/// registry lock, so a callback may subscribe or unsubscribe without
/// deadlocking.
pub struct EventDispatcher {
    inner: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    slots: Vec<Slot>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Registry::default()),
        }
    }

    /// Subscribe a callback to a signal name
    ///
    /// Returns a token for [`unsubscribe`](Self::unsubscribe). The same
    /// callback may be subscribed to any number of signals; each
    /// subscription gets its own token.
    pub fn subscribe<F>(&self, signal: impl Into<String>, callback: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;

        inner.slots.push(Slot {
            id,
            signal: signal.into(),
            callback: Arc::new(callback),
        });

        SubscriptionId(id)
    }

    /// Remove one subscription by token
    ///
    /// Returns false if the token was already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.slots.len();
        inner.slots.retain(|slot| slot.id != id.0);
        inner.slots.len() != before
    }

    /// Deliver a notification to every callback subscribed to `signal`
    pub fn emit(&self, signal: &str, notification: &Notification) {
        // Snapshot matching callbacks, then call them with the lock released.
        let callbacks: Vec<Callback> = {
            let inner = self.inner.lock();
            inner
                .slots
                .iter()
                .filter(|slot| slot.signal == signal)
                .map(|slot| Arc::clone(&slot.callback))
                .collect()
        };

        for callback in callbacks {
            callback(notification);
        }
    }

    /// Returns true if any callback is subscribed to `signal`
    pub fn has_handlers(&self, signal: &str) -> bool {
        self.inner.lock().slots.iter().any(|s| s.signal == signal)
    }

    /// Number of active subscriptions for `signal`
    pub fn handler_count(&self, signal: &str) -> usize {
        self.inner
            .lock()
            .slots
            .iter()
            .filter(|s| s.signal == signal)
            .count()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("EventDispatcher")
            .field("subscriptions", &inner.slots.len())
            .finish()
    }
}
