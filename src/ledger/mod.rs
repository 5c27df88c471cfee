//! Ledger Module
//!
//! Interfaces to the collaborators that own the live chain.
//!
//! ## Responsibilities
//! - Report the current chain height
//! - Hand out blocks by id range, ascending
//! - Supply the maximum block payload size

mod memory;

pub use memory::MemoryLedger;

use crate::archive::BlockRecord;
use crate::error::Result;

/// Source of ledger blocks to archive
pub trait LedgerSource {
    /// Id of the newest block in the ledger
    fn chain_height(&self) -> Result<u64>;

    /// Blocks with `after < id <= up_to`, in ascending id order
    fn blocks(&self, after: u64, up_to: u64) -> Result<Vec<BlockRecord>>;
}

/// Provider of the configured maximum block payload size
pub trait BlockSizeLimit {
    fn max_block_size(&self) -> u64;
}

impl BlockSizeLimit for u64 {
    fn max_block_size(&self) -> u64 {
        *self
    }
}
