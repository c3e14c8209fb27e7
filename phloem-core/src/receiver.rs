//! Receiver session: readiness-driven drain loop and acknowledgment
//!
//! The receiver does not busy-poll for data in its main control path. It
//! parks on one readiness notification for the accepted connection and then
//! runs the entire session synchronously inside that single dispatch: the
//! drain across all repetitions, the acknowledgment write, and the wire
//! shutdown. Returning from [`run_session`] is the completion signal; there
//! is no idle loop and the dispatch never re-enters.

use crate::ack;
use crate::config::{ReceiverConfig, PAYLOAD_BYTES};
use crate::error::Result;
use crate::timing::micros_between;
use phloem_transport::{Readiness, Timestamp, Wire};

/// Outcome of one receiver session
#[derive(Debug, Clone, Copy)]
pub struct ReceiverReport {
    /// Total receive calls across all repetitions (the acknowledged value)
    pub read_calls: u64,
    /// Total bytes drained from the connection
    pub drained_bytes: u64,
    /// Drain-phase duration in microseconds
    pub drain_micros: u64,
}

/// Run one receiver session to completion
///
/// Blocks until the first readiness notification, then drains, acknowledges
/// and closes in one dispatch. With a zero repetition count no payload will
/// ever arrive to trigger the notification, so the dispatch runs immediately
/// and acknowledges a count of zero.
pub fn run_session<W: Wire + Readiness>(
    wire: &mut W,
    config: &ReceiverConfig,
) -> Result<ReceiverReport> {
    if config.repetition > 0 {
        wire.wait_readable()?;
    }
    on_readable(wire, config)
}

/// The single-shot dispatch: drain every repetition, acknowledge, close
fn on_readable<W: Wire>(wire: &mut W, config: &ReceiverConfig) -> Result<ReceiverReport> {
    let mut scratch = vec![0u8; PAYLOAD_BYTES];
    let mut read_calls: u64 = 0;

    let start = Timestamp::now();
    for _ in 0..config.repetition {
        let mut received = 0usize;
        // A stream read may return fewer bytes than requested; keep asking
        // for the remainder until this repetition's payload is drained.
        while received < PAYLOAD_BYTES {
            let n = wire.recv(&mut scratch[..PAYLOAD_BYTES - received])?;
            received += n;
            read_calls += 1;
        }
    }
    let stop = Timestamp::now();

    wire.send(&ack::encode(read_calls))?;
    wire.close()?;

    let drained_bytes = u64::from(config.repetition) * PAYLOAD_BYTES as u64;
    let drain_micros = micros_between(&start, &stop);
    tracing::debug!(
        "receiver session complete: {} receive calls, {} bytes, {} us",
        read_calls,
        drained_bytes,
        drain_micros
    );

    Ok(ReceiverReport { read_calls, drained_bytes, drain_micros })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::IoSlice;

    /// Serves a fixed number of bytes in chunks of at most `chunk` bytes
    struct ScriptedWire {
        /// Bytes the peer will deliver before the stream ends
        available: usize,
        /// Largest read this wire will complete in one call
        chunk: usize,
        sent: Vec<Vec<u8>>,
        recv_calls: usize,
        waits: usize,
        closed: bool,
    }

    impl ScriptedWire {
        fn new(available: usize, chunk: usize) -> Self {
            Self { available, chunk, sent: Vec::new(), recv_calls: 0, waits: 0, closed: false }
        }
    }

    impl Wire for ScriptedWire {
        fn send(&mut self, data: &[u8]) -> phloem_transport::Result<usize> {
            self.sent.push(data.to_vec());
            Ok(data.len())
        }

        fn send_vectored(&mut self, bufs: &[IoSlice<'_>]) -> phloem_transport::Result<usize> {
            Ok(bufs.iter().map(|b| b.len()).sum())
        }

        fn recv(&mut self, buf: &mut [u8]) -> phloem_transport::Result<usize> {
            self.recv_calls += 1;
            if self.available == 0 {
                return Err(phloem_transport::Error::Connection(
                    "connection closed by peer".to_string(),
                ));
            }
            let n = buf.len().min(self.chunk).min(self.available);
            self.available -= n;
            Ok(n)
        }

        fn close(&mut self) -> phloem_transport::Result<()> {
            self.closed = true;
            Ok(())
        }
    }

    impl Readiness for ScriptedWire {
        fn wait_readable(&mut self) -> phloem_transport::Result<()> {
            self.waits += 1;
            Ok(())
        }
    }

    #[test]
    fn test_full_reads_need_one_call_per_repetition() {
        let mut wire = ScriptedWire::new(5 * PAYLOAD_BYTES, PAYLOAD_BYTES);
        let report = run_session(&mut wire, &ReceiverConfig { repetition: 5 }).unwrap();

        assert_eq!(report.read_calls, 5);
        assert_eq!(report.drained_bytes, 5 * PAYLOAD_BYTES as u64);
        assert_eq!(wire.waits, 1);
        assert!(wire.closed);
    }

    #[test]
    fn test_one_byte_reads_still_terminate() {
        let mut wire = ScriptedWire::new(2 * PAYLOAD_BYTES, 1);
        let report = run_session(&mut wire, &ReceiverConfig { repetition: 2 }).unwrap();

        assert_eq!(report.read_calls, 2 * PAYLOAD_BYTES as u64);
        assert_eq!(report.drained_bytes, 2 * PAYLOAD_BYTES as u64);
    }

    #[test]
    fn test_ragged_reads_never_cross_a_repetition() {
        // 700-byte chunks force 700/700/100 per repetition
        let mut wire = ScriptedWire::new(3 * PAYLOAD_BYTES, 700);
        let report = run_session(&mut wire, &ReceiverConfig { repetition: 3 }).unwrap();

        assert_eq!(report.read_calls, 9);
        assert_eq!(report.drained_bytes, 3 * PAYLOAD_BYTES as u64);
    }

    #[test]
    fn test_acknowledgment_carries_the_read_count() {
        let mut wire = ScriptedWire::new(4 * PAYLOAD_BYTES, 613);
        let report = run_session(&mut wire, &ReceiverConfig { repetition: 4 }).unwrap();

        assert_eq!(wire.sent.len(), 1);
        assert_eq!(wire.sent[0], ack::encode(report.read_calls).to_vec());
    }

    #[test]
    fn test_zero_repetition_skips_the_readiness_wait() {
        let mut wire = ScriptedWire::new(0, PAYLOAD_BYTES);
        let report = run_session(&mut wire, &ReceiverConfig { repetition: 0 }).unwrap();

        assert_eq!(report.read_calls, 0);
        assert_eq!(report.drained_bytes, 0);
        assert_eq!(wire.waits, 0);
        assert_eq!(wire.recv_calls, 0);
        assert_eq!(wire.sent[0], ack::encode(0).to_vec());
        assert!(wire.closed);
    }

    #[test]
    fn test_peer_close_mid_drain_fails_the_session() {
        // Stream ends one repetition short
        let mut wire = ScriptedWire::new(PAYLOAD_BYTES, PAYLOAD_BYTES);
        let result = run_session(&mut wire, &ReceiverConfig { repetition: 2 });

        assert!(result.is_err());
        assert!(wire.sent.is_empty(), "no acknowledgment after a failed drain");
    }

    #[test]
    fn test_drain_never_requests_past_the_repetition_boundary() {
        struct BoundaryCheckingWire(ScriptedWire);

        impl Wire for BoundaryCheckingWire {
            fn send(&mut self, data: &[u8]) -> phloem_transport::Result<usize> {
                self.0.send(data)
            }
            fn send_vectored(&mut self, bufs: &[IoSlice<'_>]) -> phloem_transport::Result<usize> {
                self.0.send_vectored(bufs)
            }
            fn recv(&mut self, buf: &mut [u8]) -> phloem_transport::Result<usize> {
                assert!(buf.len() <= PAYLOAD_BYTES);
                assert!(!buf.is_empty());
                self.0.recv(buf)
            }
            fn close(&mut self) -> phloem_transport::Result<()> {
                self.0.close()
            }
        }

        impl Readiness for BoundaryCheckingWire {
            fn wait_readable(&mut self) -> phloem_transport::Result<()> {
                self.0.wait_readable()
            }
        }

        let mut wire = BoundaryCheckingWire(ScriptedWire::new(2 * PAYLOAD_BYTES, 997));
        let report = run_session(&mut wire, &ReceiverConfig { repetition: 2 }).unwrap();
        assert_eq!(report.drained_bytes, 2 * PAYLOAD_BYTES as u64);
    }
}
