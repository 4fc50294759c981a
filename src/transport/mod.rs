//! Transport Module
//!
//! Byte-level I/O over a stream: TCP for ServerQuery, UDP for the
//! single-datagram micro-protocols. The trait seam lets the adapter run
//! against a scripted transport in tests.

mod tcp;
mod udp;

pub use tcp::TcpTransport;
pub use udp::UdpTransport;

use crate::error::Result;
use crate::protocol::SEPARATOR_LINE;

/// Upper bound for a single write; longer payloads are chunked
pub const SEND_CHUNK_SIZE: usize = 4096;

/// Read size for one socket read while accumulating a line
pub const READ_CHUNK_SIZE: usize = 4096;

/// A connected, line-capable byte stream
///
/// `connect` and `disconnect` are idempotent. Reads in blocking mode block
/// up to the configured timeout; in non-blocking mode they poll, surfacing
/// a wait-timeout notification each time the timeout elapses. A closed peer
/// is fatal to the connection and is never retried here.
pub trait Transport {
    /// Open the underlying socket; no-op if already connected
    fn connect(&mut self) -> Result<()>;

    /// Release the socket; safe to call repeatedly
    fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Whether reads block (the default) or poll
    fn is_blocking(&self) -> bool;

    /// Write the full payload, chunked into fixed-size blocks
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Read up to `max_len` bytes
    fn read(&mut self, max_len: usize) -> Result<Vec<u8>>;

    /// Accumulate bytes until the line terminator and return the trimmed line
    ///
    /// Bytes past the terminator are kept for the next read. A peer close
    /// mid-line is fatal; a close on a line boundary reports a clean
    /// disconnect (still an error to this read).
    fn read_line(&mut self) -> Result<String>;

    /// Write a payload followed by the line terminator
    ///
    /// Chunks like [`send`](Self::send); the terminator is appended to the
    /// final chunk only.
    fn send_line(&mut self, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            return self.send(&[SEPARATOR_LINE as u8]);
        }

        let mut seek = 0;
        while seek < data.len() {
            let end = usize::min(seek + SEND_CHUNK_SIZE, data.len());

            if end == data.len() {
                let mut last = Vec::with_capacity(end - seek + 1);
                last.extend_from_slice(&data[seek..end]);
                last.push(SEPARATOR_LINE as u8);
                self.send(&last)?;
            } else {
                self.send(&data[seek..end])?;
            }

            seek = end;
        }

        Ok(())
    }
}
