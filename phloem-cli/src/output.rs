//! Results output formatting

use anyhow::Result;
use phloem_core::sender::SenderReport;
use phloem_core::TransferConfig;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One sender run, reduced to its reportable numbers
#[derive(Debug, Clone, Serialize)]
pub struct SenderResults {
    pub server: String,
    pub port: u16,
    pub strategy: String,
    pub scenario: u8,
    pub repetition: u32,
    pub buffer_count: usize,
    pub buffer_size: usize,
    pub bytes_sent: u64,
    pub send_phase_us: u64,
    pub round_trip_us: u64,
    pub remote_read_calls: u64,
}

impl SenderResults {
    /// Build results from a completed session report
    pub fn from_report(
        server: &str,
        port: u16,
        config: &TransferConfig,
        report: &SenderReport,
    ) -> Self {
        Self {
            server: server.to_string(),
            port,
            strategy: report.strategy.to_string(),
            scenario: report.strategy.scenario(),
            repetition: config.repetition,
            buffer_count: config.buffer_count,
            buffer_size: config.buffer_size,
            bytes_sent: report.bytes_sent,
            send_phase_us: report.timing.send_phase_micros(),
            round_trip_us: report.timing.round_trip_micros(),
            remote_read_calls: report.remote_read_calls,
        }
    }

    /// Print results to stdout in human-readable format
    pub fn print_human(&self) {
        println!("\n{}", "=".repeat(60));
        println!("Phloem Transfer-Overhead Results");
        println!("{}", "=".repeat(60));
        println!();
        println!("Configuration:");
        println!("  Target:            {}:{}", self.server, self.port);
        println!("  Strategy:          {} (scenario {})", self.strategy, self.scenario);
        println!("  Repetitions:       {}", self.repetition);
        println!("  Buffers:           {} x {} bytes", self.buffer_count, self.buffer_size);
        println!();
        println!("Measurement:");
        println!("  Bytes sent:        {}", self.bytes_sent);
        println!("  Data-sending time: {} usec", self.send_phase_us);
        println!("  Round-trip time:   {} usec", self.round_trip_us);
        println!("  Remote reads:      {}", self.remote_read_calls);
        println!();
        println!("{}", "=".repeat(60));
    }

    /// Write results to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        let json = serde_json::to_string_pretty(self)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use phloem_core::timing::TimingSample;
    use phloem_core::Strategy;
    use phloem_transport::Timestamp;

    fn sample_results() -> SenderResults {
        let now = Timestamp::now();
        let report = SenderReport {
            strategy: Strategy::Vectored,
            timing: TimingSample { start: now, lap: now, stop: now },
            bytes_sent: 150_000,
            remote_read_calls: 123,
        };
        let config = TransferConfig {
            repetition: 100,
            buffer_count: 3,
            buffer_size: 500,
            strategy: Strategy::Vectored,
        };
        SenderResults::from_report("localhost", 2117, &config, &report)
    }

    #[test]
    fn test_json_export() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("results.json");

        let results = sample_results();
        results.write_json(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["strategy"], "vectored");
        assert_eq!(parsed["scenario"], 2);
        assert_eq!(parsed["remote_read_calls"], 123);
        assert_eq!(parsed["bytes_sent"], 150_000);
    }
}
