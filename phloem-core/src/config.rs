//! Session parameters and their validation
//!
//! Both binaries validate their arguments here before any socket activity;
//! invalid parameters never reach a session.

use crate::error::{Error, Result};
use crate::strategy::Strategy;

/// Total bytes transferred per repetition, across all buffers
pub const PAYLOAD_BYTES: usize = 1500;

/// Lowest port accepted by either side
pub const PORT_RANGE_START: u16 = 1024;

/// Immutable parameters of one sender session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferConfig {
    /// Number of times the whole payload is transmitted
    pub repetition: u32,
    /// Number of equal-sized buffers the payload is split into
    pub buffer_count: usize,
    /// Size of each buffer in bytes
    pub buffer_size: usize,
    /// Transmission strategy under measurement
    pub strategy: Strategy,
}

impl TransferConfig {
    /// Check the payload-shape invariant
    ///
    /// `buffer_count × buffer_size` must equal [`PAYLOAD_BYTES`] exactly,
    /// with at least one buffer.
    pub fn validate(&self) -> Result<()> {
        if self.buffer_count == 0 {
            return Err(Error::Config("buffer count must be at least 1".to_string()));
        }
        if self.buffer_count * self.buffer_size != PAYLOAD_BYTES {
            return Err(Error::Config(format!(
                "the product of buffer count ({}) and buffer size ({}) must equal {PAYLOAD_BYTES}",
                self.buffer_count, self.buffer_size
            )));
        }
        Ok(())
    }
}

/// Immutable parameters of one receiver session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverConfig {
    /// Number of payload repetitions the sender will transmit
    pub repetition: u32,
}

/// Check that a port lies in the accepted range `[1024, 65536)`
pub fn validate_port(port: u16) -> Result<()> {
    if port < PORT_RANGE_START {
        return Err(Error::Config(format!(
            "port {port} is outside the allowed range ({PORT_RANGE_START}-65535)"
        )));
    }
    Ok(())
}
