//! # tsquery
//!
//! A synchronous client library for the TeamSpeak 3 ServerQuery protocol:
//! - Wire codec for the protocol's escaping and cell/list encoding
//! - Line-buffered TCP transport (blocking or polled non-blocking reads)
//! - Reply parsing with typed rows and interleaved-event capture
//! - Command adapter with correct error semantics and event waiting
//!
//! ## Architecture Overview
//!
//! ```text
//! caller
//!   │  prepare / request / wait
//!   ▼
//! ┌───────────────────────────────┐      ┌───────────────────┐
//! │        QueryAdapter           │─────▶│  EventDispatcher  │
//! │  (command/reply state machine)│      │  (injected)       │
//! └──────────────┬────────────────┘      └───────────────────┘
//!                │ send_line / read_line
//! ┌──────────────▼────────────────┐
//! │          Transport            │  TCP (ServerQuery)
//! │  (line-buffered byte stream)  │  UDP (micro-protocols)
//! └──────────────┬────────────────┘
//!                │ lines
//! ┌──────────────▼────────────────┐
//! │     Reply / Event parsers     │
//! │  (escaping, rows, status line)│
//! └───────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod adapter;
pub mod dispatch;
pub mod protocol;
pub mod transport;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use adapter::QueryAdapter;
pub use config::Config;
pub use dispatch::{EventDispatcher, Notification, SubscriptionId};
pub use error::{QueryError, Result};
pub use protocol::{Command, Event, Reply, ReplyList, Row, Value};
pub use transport::{TcpTransport, Transport, UdpTransport};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tsquery
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
