//! UDP Transport
//!
//! Single-datagram transport for the auxiliary micro-protocols (server
//! update and blacklist checks): one request out, one fixed-length response
//! back, no line framing on the wire.

use std::net::UdpSocket;
use std::sync::Arc;

use crate::config::Config;
use crate::dispatch::{signals, EventDispatcher, Notification};
use crate::error::{QueryError, Result};
use crate::protocol::SEPARATOR_LINE;
use crate::transport::Transport;

/// UDP datagram transport
pub struct UdpTransport {
    config: Config,
    dispatcher: Arc<EventDispatcher>,
    socket: Option<UdpSocket>,
}

impl UdpTransport {
    pub fn new(config: Config, dispatcher: Arc<EventDispatcher>) -> Self {
        Self {
            config,
            dispatcher,
            socket: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn lost(&self) -> QueryError {
        QueryError::ConnectionLost(self.config.address())
    }

    fn socket(&mut self) -> Result<&UdpSocket> {
        self.socket
            .as_ref()
            .ok_or_else(|| QueryError::ConnectionLost(self.config.address()))
    }
}

impl Transport for UdpTransport {
    fn connect(&mut self) -> Result<()> {
        if self.socket.is_some() {
            return Ok(());
        }

        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(self.config.address())?;
        socket.set_read_timeout(Some(self.config.timeout))?;
        socket.set_write_timeout(Some(self.config.timeout))?;

        tracing::debug!("bound datagram socket for {}", self.config.address());
        self.socket = Some(socket);

        Ok(())
    }

    fn disconnect(&mut self) {
        if self.socket.take().is_some() {
            tracing::debug!("released datagram socket for {}", self.config.address());
            self.dispatcher
                .emit(signals::DISCONNECTED, &Notification::Disconnected);
        }
    }

    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    fn is_blocking(&self) -> bool {
        // Datagram exchanges are always synchronous request/response.
        true
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.connect()?;
        self.socket()?.send(data)?;

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

        let mut buf = vec![0u8; max_len];
        let n = match self.socket()?.recv(&mut buf) {
            Ok(n) => n,
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                return Err(self.lost());
            }
            Err(e) => return Err(e.into()),
        };
        buf.truncate(n);

        self.dispatcher.emit(
            signals::DATA_READ,
            &Notification::DataRead { bytes: buf.clone() },
        );

        Ok(buf)
    }

    fn read_line(&mut self) -> Result<String> {
        // One datagram is one message; strip any trailing terminator.
        let data = self.read(crate::transport::READ_CHUNK_SIZE)?;
        Ok(String::from_utf8_lossy(&data).trim().to_string())
    }

    /// A datagram must leave in one piece, so the payload is never chunked.
    fn send_line(&mut self, data: &[u8]) -> Result<()> {
        let mut datagram = Vec::with_capacity(data.len() + 1);
        datagram.extend_from_slice(data);
        datagram.push(SEPARATOR_LINE as u8);
        self.send(&datagram)
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}
