//! Payload storage for a sender session

/// The payload to transmit: `buffer_count` buffers of `buffer_size` bytes,
/// backed by one contiguous heap allocation owned by the session
///
/// Contiguous backing serves all three strategies from the same storage:
/// the single-block strategy sends the whole allocation, the others address
/// each buffer through [`chunks`](Self::chunks). Buffer content is
/// irrelevant to the measurement and is left zeroed.
#[derive(Debug)]
pub struct BufferSet {
    data: Vec<u8>,
    buffer_count: usize,
    buffer_size: usize,
}

impl BufferSet {
    /// Allocate `buffer_count` zeroed buffers of `buffer_size` bytes each
    ///
    /// `buffer_size` must be non-zero; session configs are validated before
    /// a buffer set is built.
    pub fn new(buffer_count: usize, buffer_size: usize) -> Self {
        Self { data: vec![0u8; buffer_count * buffer_size], buffer_count, buffer_size }
    }

    /// The independent per-buffer views, in transmission order
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.buffer_size)
    }

    /// The whole payload as one contiguous block
    pub fn contiguous(&self) -> &[u8] {
        &self.data
    }

    /// Total payload bytes per repetition
    pub fn total_len(&self) -> usize {
        self.data.len()
    }

    /// Number of buffers
    pub fn buffer_count(&self) -> usize {
        self.buffer_count
    }

    /// Size of each buffer in bytes
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}
