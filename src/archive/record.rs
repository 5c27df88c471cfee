//! Archive record definitions
//!
//! Defines the block record stored in one archive frame.

use bytes::Bytes;

/// A single ledger block as stored in the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    /// Block sequence number - strictly increasing through the archive
    pub id: u64,

    /// Opaque block contents
    pub payload: Bytes,
}

impl BlockRecord {
    /// Create a new record
    pub fn new(id: u64, payload: impl Into<Bytes>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }

    /// Size of the payload in bytes
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}
