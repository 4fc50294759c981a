//! Configuration for tsquery connections
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::error::{QueryError, Result};

/// Default ServerQuery TCP port
pub const DEFAULT_PORT: u16 = 10011;

/// Default connect/read timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection configuration for a ServerQuery transport
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host name or IP address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Connect timeout; also the read timeout in blocking mode and the
    /// wait-timeout notification interval in non-blocking mode
    pub timeout: Duration,

    /// Blocking read semantics (default). Non-blocking mode is only
    /// meaningful for the adapter's `wait()` operation.
    pub blocking: bool,
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Returns the `host:port` address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builder for Config
///
/// `build()` validates the parameters and fails with a configuration
/// error if the host is missing.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    timeout: Option<Duration>,
    blocking: Option<bool>,
}

impl ConfigBuilder {
    /// Set the server host name (required)
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the server port (default 10011)
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the connect/read timeout (default 10 seconds)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set blocking or non-blocking read semantics (default blocking)
    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = Some(blocking);
        self
    }

    pub fn build(self) -> Result<Config> {
        let host = match self.host {
            Some(host) if !host.trim().is_empty() => host,
            _ => {
                return Err(QueryError::Config(
                    "config must specify the server host name".to_string(),
                ))
            }
        };

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(QueryError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(Config {
            host,
            port: self.port.unwrap_or(DEFAULT_PORT),
            timeout,
            blocking: self.blocking.unwrap_or(true),
        })
    }
}
