//! TCP Transport
//!
//! Line-buffered stream transport for the ServerQuery connection.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;

use crate::config::Config;
use crate::dispatch::{signals, EventDispatcher, Notification};
use crate::error::{QueryError, Result};
use crate::protocol::SEPARATOR_LINE;
use crate::transport::{Transport, READ_CHUNK_SIZE};

/// Sleep between readiness polls in non-blocking mode
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// TCP stream transport
///
/// Reads keep an internal buffer so bytes received past a line terminator
/// (interleaved events, pipelined reply rows) are never lost between calls.
pub struct TcpTransport {
    config: Config,
    dispatcher: Arc<EventDispatcher>,
    stream: Option<TcpStream>,
    buffer: BytesMut,
}

impl TcpTransport {
    pub fn new(config: Config, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            stream: None,
            buffer: BytesMut::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn lost(&self) -> QueryError {
        QueryError::ConnectionLost(self.config.address())
    }

    /// One socket read honoring the blocking mode
    ///
    /// Returns the number of bytes read; a peer close or (in blocking mode)
    /// a read timeout is fatal. In non-blocking mode, polls until data is
    /// available, emitting a wait-timeout notification each time the
    /// configured timeout elapses.
    fn read_socket(&mut self, buf: &mut [u8]) -> Result<usize> {
        let blocking = self.config.blocking;
        let timeout = self.config.timeout;
        let mut waited = Duration::ZERO;
        let mut last_notify = Instant::now();

        loop {
            let stream = self
                .stream
                .as_mut()
                .ok_or_else(|| QueryError::ConnectionLost(self.config.address()))?;

            match stream.read(buf) {
                Ok(0) => {
                    tracing::debug!("server {} closed the connection", self.config.address());
                    return Err(self.lost());
                }
                Ok(n) => {
                    self.dispatcher.emit(
                        signals::DATA_READ,
                        &Notification::DataRead {
                            bytes: buf[..n].to_vec(),
                        },
                    );
                    return Ok(n);
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    if blocking {
                        // A timed-out read on the query stream means the
                        // server went away mid-conversation.
                        tracing::warn!(
                            "read timeout after {:?} on {}",
                            timeout,
                            self.config.address()
                        );
                        return Err(self.lost());
                    }

                    if last_notify.elapsed() >= timeout {
                        waited += last_notify.elapsed();
                        last_notify = Instant::now();
                        self.dispatcher.emit(
                            signals::WAIT_TIMEOUT,
                            &Notification::WaitTimeout { waited },
                        );
                    }

                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write_socket(&mut self, data: &[u8]) -> Result<()> {
        let mut written = 0;

        while written < data.len() {
            let stream = self
                .stream
                .as_mut()
                .ok_or_else(|| QueryError::ConnectionLost(self.config.address()))?;

            match stream.write(&data[written..]) {
                Ok(0) => return Err(self.lost()),
                Ok(n) => written += n,
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let address = self.config.address();
        let addr = address
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| QueryError::Config(format!("cannot resolve '{}'", address)))?;

        let stream = TcpStream::connect_timeout(&addr, self.config.timeout)?;

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        if self.config.blocking {
            stream.set_read_timeout(Some(self.config.timeout))?;
            stream.set_write_timeout(Some(self.config.timeout))?;
        } else {
            stream.set_nonblocking(true)?;
        }

        tracing::debug!("connected to {}", address);
        self.stream = Some(stream);
        self.buffer.clear();

        Ok(())
    }

    fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("disconnected from {}", self.config.address());
            self.dispatcher
                .emit(signals::DISCONNECTED, &Notification::Disconnected);
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn is_blocking(&self) -> bool {
        self.config.blocking
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.connect()?;
        self.write_socket(data)?;

        self.dispatcher.emit(
            signals::DATA_SENT,
            &Notification::DataSent {
                bytes: data.to_vec(),
            },
        );

        Ok(())
    }

    fn read(&mut self, max_len: usize) -> Result<Vec<u8>> {
        self.connect()?;

        // Serve buffered bytes first; they were announced when they came
        // off the socket.
        if !self.buffer.is_empty() {
            let n = usize::min(max_len, self.buffer.len());
            return Ok(self.buffer.split_to(n).to_vec());
        }

        let mut buf = vec![0u8; max_len];
        let n = self.read_socket(&mut buf)?;
        buf.truncate(n);

        Ok(buf)
    }

    fn read_line(&mut self) -> Result<String> {
        self.connect()?;

        loop {
            if let Some(pos) = self
                .buffer
                .iter()
                .position(|&b| b == SEPARATOR_LINE as u8)
            {
                let line = self.buffer.split_to(pos + 1);
                let line = String::from_utf8_lossy(&line).trim().to_string();
                tracing::trace!("<- {}", line);
                return Ok(line);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            match self.read_socket(&mut chunk) {
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    if !self.buffer.is_empty() {
                        tracing::warn!(
                            "{} closed mid-line with {} unterminated bytes",
                            self.config.address(),
                            self.buffer.len()
                        );
                    } else {
                        tracing::debug!("{} disconnected cleanly", self.config.address());
                    }
                    return Err(e);
                }
            }
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}
