//! Error types for tsquery
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using QueryError
pub type Result<T> = std::result::Result<T, QueryError>;

/// Unified error type for tsquery operations
#[derive(Debug, Error)]
pub enum QueryError {
    // -------------------------------------------------------------------------
    // Transport Errors (fatal to the connection, never retried)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection to server '{0}' lost")]
    ConnectionLost(String),

    // -------------------------------------------------------------------------
    // Protocol Framing Errors (fatal to the current operation)
    // -------------------------------------------------------------------------
    #[error("protocol error: {0}")]
    Framing(String),

    // -------------------------------------------------------------------------
    // ServerQuery Errors (application-level, reported by the server)
    // -------------------------------------------------------------------------
    #[error("server error {id}: {msg}")]
    ServerQuery { id: i64, msg: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),
}

impl QueryError {
    /// Error id the server uses for an unknown command
    pub const ID_COMMAND_NOT_FOUND: i64 = 0x100;

    /// Error id the server uses for an invalid parameter
    pub const ID_INVALID_PARAMETER: i64 = 0x602;

    /// Build a `ServerQuery` error from an id and message
    pub fn server(id: i64, msg: impl Into<String>) -> Self {
        QueryError::ServerQuery {
            id,
            msg: msg.into(),
        }
    }

    /// Returns true if the connection remains usable after this error
    ///
    /// Only application-level `ServerQuery` errors are recoverable; the
    /// caller decides whether to retry. Transport errors kill the
    /// connection, framing errors kill the current operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, QueryError::ServerQuery { .. })
    }

    /// Returns the server-reported error id, if this is a `ServerQuery` error
    pub fn server_error_id(&self) -> Option<i64> {
        match self {
            QueryError::ServerQuery { id, .. } => Some(*id),
            _ => None,
        }
    }
}
