//! Phloem Core Library
//!
//! Session logic for the phloem transfer-overhead probe: the three
//! transmission strategies, the partial-read-tolerant drain loop with its
//! readiness-driven dispatch, and the timing and acknowledgment protocol
//! shared by the sender and receiver binaries.

pub mod ack;
pub mod buffers;
pub mod config;
pub mod error;
pub mod receiver;
pub mod sender;
pub mod strategy;
pub mod timing;

pub use config::{ReceiverConfig, TransferConfig, PAYLOAD_BYTES};
pub use error::{Error, Result};
pub use strategy::Strategy;

// Re-export the transport seams session callers need
pub use phloem_transport::{Readiness, Timestamp, Wire};
