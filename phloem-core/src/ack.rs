//! The acknowledgment exchanged once per session
//!
//! The only data flowing receiver to sender: the receiver's total
//! receive-call count as one native-endian `u64`, sent raw with no framing.
//! Receiving it is the sender's proof that the stream has been fully
//! drained, so the round-trip timestamp can be taken.

/// Acknowledgment width on the wire
pub const ACK_LEN: usize = std::mem::size_of::<u64>();

/// Encode a receive-call count for transmission
pub fn encode(read_calls: u64) -> [u8; ACK_LEN] {
    read_calls.to_ne_bytes()
}

/// Decode a received acknowledgment
pub fn decode(raw: [u8; ACK_LEN]) -> u64 {
    u64::from_ne_bytes(raw)
}
