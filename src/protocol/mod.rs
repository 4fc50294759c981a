//! Protocol Module
//!
//! The ServerQuery wire grammar: escaping, command rendering, reply and
//! event parsing.
//!
//! ## Wire Format (TCP, line-oriented, UTF-8 text)
//!
//! ```text
//! Greeting:  TS3\n  Welcome ...\n            (banner, discarded)
//! Command:   <verb> [arg=value ...] [arg=value|arg=value ...]\n
//! Reply:     [row[|row ...]\n] error id=<n> msg=<text>[ key=value ...]\n
//! Event:     notify<Type> key=value[ key=value ...]\n
//! ```
//!
//! Within a row, cells are separated by a single space and each cell splits
//! on the first `=` into a key/value pair; rows are separated by `|`.
//! Reserved characters inside values travel escaped (see [`escape`]).

pub mod escape;

mod command;
mod event;
mod reply;
mod row;

pub use command::{Command, Scalar};
pub use event::Event;
pub use reply::{Reply, ReplyList};
pub use row::{decode_row, Row, Value};

/// Ready marker sent by the server as the first line of a connection
pub const READY: &str = "TS3";

/// Greeting banner prefix, discarded by the reply parser
pub const GREET: &str = "Welcome";

/// First cell of the status line terminating every reply
pub const ERROR: &str = "error";

/// Prefix of asynchronous notification lines
pub const EVENT: &str = "notify";

/// Separates rows within one reply body or command
pub const SEPARATOR_LIST: char = '|';

/// Separates cells within one row
pub const SEPARATOR_CELL: char = ' ';

/// Separates a key from its value within one cell
pub const SEPARATOR_PAIR: char = '=';

/// Terminates protocol lines
pub const SEPARATOR_LINE: char = '\n';
