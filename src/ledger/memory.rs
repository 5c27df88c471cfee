//! In-memory ledger
//!
//! BTreeMap-based ledger with RwLock, for tests, benches and tooling.

use std::collections::BTreeMap;
use std::ops::Bound;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::archive::BlockRecord;
use crate::error::Result;
use super::LedgerSource;

/// Ledger kept entirely in memory
///
/// The chain height is the highest id it holds.
pub struct MemoryLedger {
    blocks: RwLock<BTreeMap<u64, Bytes>>,
}

impl MemoryLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self {
            blocks: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a ledger holding blocks `1..=height`, each with a small payload
    pub fn with_height(height: u64) -> Self {
        let ledger = Self::new();
        ledger.extend((1..=height).map(|id| BlockRecord::new(id, format!("block-{}", id))));
        ledger
    }

    /// Add a block, returning the payload it replaced
    pub fn push(&self, id: u64, payload: impl Into<Bytes>) -> Option<Bytes> {
        self.blocks.write().insert(id, payload.into())
    }

    /// Add many blocks under one write lock
    pub fn extend(&self, records: impl IntoIterator<Item = BlockRecord>) {
        let mut blocks = self.blocks.write();
        for record in records {
            blocks.insert(record.id, record.payload);
        }
    }

    /// Number of blocks held
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerSource for MemoryLedger {
    fn chain_height(&self) -> Result<u64> {
        Ok(self.blocks.read().keys().next_back().copied().unwrap_or(0))
    }

    fn blocks(&self, after: u64, up_to: u64) -> Result<Vec<BlockRecord>> {
        if after >= up_to {
            return Ok(Vec::new());
        }

        let blocks = self.blocks.read();
        Ok(blocks
            .range((Bound::Excluded(after), Bound::Included(up_to)))
            .map(|(&id, payload)| BlockRecord::new(id, payload.clone()))
            .collect())
    }
}
