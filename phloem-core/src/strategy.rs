//! Transmission strategies and the per-repetition engine
//!
//! The three strategies transfer identical byte counts and differ only in
//! the shape of the transmission calls they issue:
//!
//! - `Sequential`: one send per buffer, `buffer_count` calls per repetition
//! - `Vectored`: one scatter-gather call over a descriptor list
//! - `Single`: one send of the payload as a contiguous block

use crate::buffers::BufferSet;
use crate::error::{Error, Result};
use phloem_transport::Wire;
use std::io::IoSlice;

/// Sender-side transmission strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One write call per buffer, in buffer order
    Sequential,
    /// A single scatter-gather write over a descriptor list
    Vectored,
    /// A single write of the payload as one contiguous block
    Single,
}

impl Strategy {
    /// Numeric scenario id used on the command line
    pub fn scenario(&self) -> u8 {
        match self {
            Strategy::Sequential => 1,
            Strategy::Vectored => 2,
            Strategy::Single => 3,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Vectored => write!(f, "vectored"),
            Strategy::Single => write!(f, "single"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "1" | "sequential" => Ok(Strategy::Sequential),
            "2" | "vectored" => Ok(Strategy::Vectored),
            "3" | "single" => Ok(Strategy::Single),
            _ => Err(Error::Config(format!("unknown strategy: {s} (expected 1, 2 or 3)"))),
        }
    }
}

/// Transmit the whole payload once using `strategy`
///
/// Returns the number of bytes handed to the wire, which is always the
/// buffer set's total length regardless of the strategy chosen.
pub fn transmit<W: Wire>(wire: &mut W, buffers: &BufferSet, strategy: Strategy) -> Result<usize> {
    match strategy {
        Strategy::Sequential => {
            let mut sent = 0;
            for buffer in buffers.chunks() {
                sent += wire.send(buffer)?;
            }
            Ok(sent)
        }
        Strategy::Vectored => {
            let descriptors: Vec<IoSlice<'_>> = buffers.chunks().map(IoSlice::new).collect();
            Ok(wire.send_vectored(&descriptors)?)
        }
        Strategy::Single => Ok(wire.send(buffers.contiguous())?),
    }
}
