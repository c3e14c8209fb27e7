//! Phloem receiver
//!
//! Accepts exactly one connection, drains `repetition × 1500` bytes through
//! the readiness-driven receive loop, acknowledges the number of receive
//! calls back to the sender, and exits. One session per process invocation;
//! repeated sessions require a fresh process.

use anyhow::{Context, Result};
use clap::Parser;
use phloem_core::{config, receiver, ReceiverConfig};
use phloem_transport::tcp;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "phloem-server")]
#[command(version, about = "Stream transfer-overhead probe (receiver)")]
struct Cli {
    /// Port to listen on (1024-65535)
    #[arg(short, long)]
    port: u16,

    /// Number of payload repetitions the sender will transmit
    #[arg(short, long)]
    repetition: u32,

    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

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

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port)
        .parse()
        .with_context(|| format!("invalid bind address {}", cli.bind))?;

    let listener = tcp::listen(addr).with_context(|| format!("failed to listen on {addr}"))?;
    println!("phloem-server listening on {addr} ({} repetitions)", cli.repetition);

    let mut wire = tcp::accept_one(&listener)?;
    if let Ok(peer) = wire.peer_addr() {
        tracing::info!("sender connected from {peer}");
    }

    let session = ReceiverConfig { repetition: cli.repetition };
    let report = receiver::run_session(&mut wire, &session)?;
    drop(listener);

    println!("Time data received: {} usec", report.drain_micros);
    println!("Receive calls: {}", report.read_calls);
    println!("Bytes drained: {}", report.drained_bytes);

    Ok(())
}
