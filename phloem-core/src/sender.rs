//! Sender session: the timed send phase plus the acknowledgment round trip

use crate::ack;
use crate::buffers::BufferSet;
use crate::config::TransferConfig;
use crate::error::Result;
use crate::strategy::{self, Strategy};
use crate::timing::TimingSample;
use phloem_transport::{Timestamp, Wire};

/// Outcome of one sender session
#[derive(Debug, Clone, Copy)]
pub struct SenderReport {
    /// Strategy the session ran
    pub strategy: Strategy,
    /// Timestamps bracketing the send phase and the round trip
    pub timing: TimingSample,
    /// Total bytes handed to the wire across all repetitions
    pub bytes_sent: u64,
    /// Receive-call count reported back by the receiver
    pub remote_read_calls: u64,
}

/// Run one sender session to completion
///
/// Transmits the payload `repetition` times with the configured strategy,
/// then blocks for the single acknowledgment and closes the wire. The
/// payload storage lives exactly as long as the session.
pub fn run_session<W: Wire>(wire: &mut W, config: &TransferConfig) -> Result<SenderReport> {
    config.validate()?;
    let buffers = BufferSet::new(config.buffer_count, config.buffer_size);

    let start = Timestamp::now();
    let mut bytes_sent = 0u64;
    for _ in 0..config.repetition {
        bytes_sent += strategy::transmit(wire, &buffers, config.strategy)? as u64;
    }
    let lap = Timestamp::now();

    let mut raw = [0u8; ack::ACK_LEN];
    wire.recv_exact(&mut raw)?;
    let stop = Timestamp::now();
    let remote_read_calls = ack::decode(raw);

    wire.close()?;

    let timing = TimingSample { start, lap, stop };
    tracing::debug!(
        "sender session complete: {} repetitions, {} bytes, ack {}",
        config.repetition,
        bytes_sent,
        remote_read_calls
    );

    Ok(SenderReport { strategy: config.strategy, timing, bytes_sent, remote_read_calls })
}
