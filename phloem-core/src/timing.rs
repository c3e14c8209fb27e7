//! Microsecond interval reporting
//!
//! Both sides reduce their timestamps to whole microseconds for output:
//! the classic `1_000_000 × Δseconds + Δmicroseconds` reduction.

use phloem_transport::Timestamp;

/// The three timestamps bracketing a sender session
#[derive(Debug, Clone, Copy)]
pub struct TimingSample {
    /// Taken before any transfer activity
    pub start: Timestamp,
    /// Taken after the last transmission call of the last repetition
    pub lap: Timestamp,
    /// Taken after the acknowledgment arrived
    pub stop: Timestamp,
}

impl TimingSample {
    /// Send-phase duration in microseconds
    pub fn send_phase_micros(&self) -> u64 {
        micros_between(&self.start, &self.lap)
    }

    /// Round-trip duration in microseconds
    pub fn round_trip_micros(&self) -> u64 {
        micros_between(&self.start, &self.stop)
    }
}

/// Whole microseconds between two timestamps (saturating at zero)
#[inline]
pub fn micros_between(earlier: &Timestamp, later: &Timestamp) -> u64 {
    later.duration_since(earlier).as_micros() as u64
}
