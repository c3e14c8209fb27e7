//! Phloem sender
//!
//! Connects to a phloem-server, transmits the 1500-byte payload
//! `repetition` times with the selected strategy, and reports the
//! send-phase duration, the round-trip duration and the receiver's
//! read-call count.

use anyhow::{Context, Result};
use clap::Parser;
use phloem_core::{config, sender, Strategy, TransferConfig};
use phloem_transport::TcpConduit;
use std::net::{SocketAddr, ToSocketAddrs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

use output::SenderResults;

/// Point-to-point transfer-overhead probe (sender side)
///
/// The payload is always 1500 bytes per repetition, split into
/// buffer-count buffers of buffer-size bytes each. Strategies:
///
///   1 | sequential   one write per buffer, buffer-count writes per repetition
///   2 | vectored     one scatter-gather write over all buffers
///   3 | single       one write of the whole payload as a contiguous block
#[derive(Parser)]
#[command(name = "phloem")]
#[command(version, about = "Stream transfer-overhead probe (sender)")]
struct Cli {
    /// Server host name or IP address
    #[arg(short, long)]
    server: String,

    /// Server port to connect to (1024-65535)
    #[arg(short, long)]
    port: u16,

    /// Number of times the payload set is transmitted
    #[arg(short, long)]
    repetition: u32,

    /// Number of data buffers (product with --buffer-size must be 1500)
    #[arg(short = 'n', long)]
    buffer_count: usize,

    /// Size of each data buffer in bytes
    #[arg(short = 'b', long)]
    buffer_size: usize,

    /// Transfer strategy: 1|sequential, 2|vectored, 3|single
    #[arg(short = 't', long)]
    strategy: Strategy,

    /// Write results to a JSON file in addition to stdout
    #[arg(long, value_name = "PATH")]
    json: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config::validate_port(cli.port)?;
    let transfer = TransferConfig {
        repetition: cli.repetition,
        buffer_count: cli.buffer_count,
        buffer_size: cli.buffer_size,
        strategy: cli.strategy,
    };
    transfer.validate()?;

    let target = resolve(&cli.server, cli.port)?;
    tracing::info!("connecting to {target}");
    let mut wire =
        TcpConduit::connect(&target).with_context(|| format!("failed to connect to {target}"))?;

    let report = sender::run_session(&mut wire, &transfer)?;

    let results = SenderResults::from_report(&cli.server, cli.port, &transfer, &report);
    results.print_human();
    if let Some(path) = &cli.json {
        results.write_json(path)?;
        tracing::info!("results written to {}", path.display());
    }

    Ok(())
}

/// Resolve a host name or IP address to a socket address
fn resolve(server: &str, port: u16) -> Result<SocketAddr> {
    let mut addrs = (server, port)
        .to_socket_addrs()
        .with_context(|| format!("could not resolve {server}"))?;
    addrs.next().ok_or_else(|| anyhow::anyhow!("no address found for {server}"))
}
