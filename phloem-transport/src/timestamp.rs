//! Timestamps for interval measurement
//!
//! Session timing uses RDTSC on x86_64, with a one-time calibration against
//! the monotonic clock, so the probe stays cheap next to the syscalls it
//! brackets. Other architectures fall back to `Instant`.

use std::time::{Duration, Instant};

/// A point-in-time marker with sub-microsecond resolution
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    /// CPU cycle count (RDTSC) or nanoseconds since program start
    cycles: u64,
}

impl Timestamp {
    /// Capture the current time
    #[inline(always)]
    pub fn now() -> Self {
        Self { cycles: rdtsc() }
    }

    /// Duration elapsed since an earlier timestamp
    ///
    /// Saturates to zero when `earlier` is not actually earlier.
    #[inline]
    pub fn duration_since(&self, earlier: &Timestamp) -> Duration {
        let delta_cycles = self.cycles.saturating_sub(earlier.cycles);
        let nanos = get_calibration().cycles_to_nanos(delta_cycles);
        Duration::from_nanos(nanos)
    }

    /// Raw cycle count (for ordering comparisons)
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

/// Calibration data for converting RDTSC cycles to nanoseconds
struct TscCalibration {
    cycles_per_ns: f64,
}

impl TscCalibration {
    fn calibrate() -> Self {
        // Calibrate by measuring cycles over a known duration
        let start_cycles = rdtsc();
        let start_instant = Instant::now();

        std::thread::sleep(Duration::from_millis(10));

        let end_cycles = rdtsc();
        let elapsed_ns = start_instant.elapsed().as_nanos() as f64;

        let cycles = (end_cycles - start_cycles) as f64;
        let cycles_per_ns = cycles / elapsed_ns;

        Self { cycles_per_ns }
    }

    fn cycles_to_nanos(&self, cycles: u64) -> u64 {
        (cycles as f64 / self.cycles_per_ns) as u64
    }
}

/// Get calibration data (initialized once)
fn get_calibration() -> &'static TscCalibration {
    static CALIBRATION: std::sync::OnceLock<TscCalibration> = std::sync::OnceLock::new();
    CALIBRATION.get_or_init(TscCalibration::calibrate)
}

/// Read the CPU timestamp counter with serialization
///
/// Uses RDTSCP which includes a memory barrier to ensure the timestamp
/// is taken after all previous instructions complete.
#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn rdtsc() -> u64 {
    unsafe {
        let mut _aux: u32 = 0;
        core::arch::x86_64::__rdtscp(&mut _aux)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
fn rdtsc() -> u64 {
    // Fallback for non-x86_64: use Instant
    static START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    let start = START.get_or_init(Instant::now);
    start.elapsed().as_nanos() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_now_is_monotonic() {
        let t1 = Timestamp::now();
        std::thread::sleep(Duration::from_micros(100));
        let t2 = Timestamp::now();

        assert!(t2.cycles() > t1.cycles());
    }

    #[test]
    fn test_duration_since() {
        let t1 = Timestamp::now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = Timestamp::now();

        let duration = t2.duration_since(&t1);
        // Should be approximately 10ms (allow some variance)
        assert!(duration.as_millis() >= 5 && duration.as_millis() <= 50);
    }

    #[test]
    fn test_duration_since_saturates_on_reversed_order() {
        let t1 = Timestamp::now();
        std::thread::sleep(Duration::from_millis(1));
        let t2 = Timestamp::now();

        assert_eq!(t1.duration_since(&t2), Duration::ZERO);
    }
}
