//! Phloem Transport Layer
//!
//! Low-level stream I/O for the phloem transfer-overhead probe. A
//! [`TcpConduit`] wraps one connected, non-blocking TCP endpoint together
//! with its readiness poll; the connection is the only channel between the
//! two sides of a measurement session.
//!
//! The sender and receiver cores program against the [`Wire`] and
//! [`Readiness`] traits rather than the TCP type directly, which keeps the
//! drain loop and the strategy engine testable against scripted endpoints.

use std::fmt;
use std::io::IoSlice;

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, Error>;

/// Transport layer error types
#[derive(Debug)]
pub enum Error {
    /// I/O errors from the socket layer
    Io(std::io::Error),

    /// Connection errors
    Connection(String),

    /// Configuration errors
    Config(String),

    /// Other errors
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Connection(msg) => write!(f, "Connection error: {msg}"),
            Error::Config(msg) => write!(f, "Configuration error: {msg}"),
            Error::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// A connected stream endpoint
///
/// All operations are blocking at the logical level: a send hands its whole
/// buffer to the transport before returning, a receive returns at least one
/// byte or fails. Short writes and `WouldBlock` are absorbed inside each
/// call, so the call counts observed through this trait are the call counts
/// the measurement reports.
pub trait Wire: Send {
    /// Transmit one buffer in full
    ///
    /// One logical transmission call. Returns the number of bytes written,
    /// which is always `data.len()` on success.
    fn send(&mut self, data: &[u8]) -> Result<usize>;

    /// Transmit a descriptor list in one scatter-gather call
    ///
    /// One logical transmission call covering every slice in order. Returns
    /// the total number of bytes written.
    fn send_vectored(&mut self, bufs: &[IoSlice<'_>]) -> Result<usize>;

    /// Receive into `buf` with a single successful read
    ///
    /// Blocks until the endpoint is readable, then returns the number of
    /// bytes read (at least 1, at most `buf.len()`). A zero-byte read means
    /// the peer closed the connection and is reported as a connection error.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Receive until `buf` is completely filled
    fn recv_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            filled += self.recv(&mut buf[filled..])?;
        }
        Ok(())
    }

    /// Close the endpoint and release its resources
    ///
    /// Closing an already-closed endpoint is a no-op; any other operation on
    /// a closed endpoint fails with a connection error.
    fn close(&mut self) -> Result<()>;
}

/// Readiness notification for a stream endpoint
pub trait Readiness {
    /// Block until the endpoint has data available to read
    fn wait_readable(&mut self) -> Result<()>;
}

pub mod tcp;
mod timestamp;

pub use tcp::TcpConduit;
pub use timestamp::Timestamp;
