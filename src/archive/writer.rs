//! Archive Writer
//!
//! Appends the next batch of ledger blocks to the archive (catch-up).

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::{Config, SyncStrategy};
use crate::error::{ArchiveError, FormatError, Result};
use crate::ledger::LedgerSource;
use super::codec::{self, MAX_WORD};
use super::{locate_last, BlockRecord};

/// What one catch-up cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendSummary {
    /// Last id found in the archive before the cycle (0 if none)
    pub last_saved_id: u64,

    /// Ledger height reported at the start of the cycle
    pub chain_height: u64,

    /// Number of frames appended
    pub written: u64,

    /// Id of the first frame appended
    pub first_written_id: Option<u64>,

    /// Id of the last frame appended
    pub last_written_id: Option<u64>,
}

impl AppendSummary {
    pub fn is_noop(&self) -> bool {
        self.written == 0
    }
}

/// Copies blocks from a ledger into an archive file
///
/// Holds no state of its own: the resume point is read back from the
/// archive on every call, so re-running after a crash picks up correctly.
pub struct ArchiveWriter<'a, L: LedgerSource + ?Sized> {
    ledger: &'a L,
    max_block_size: u64,
    sync_strategy: SyncStrategy,
}

impl<'a, L: LedgerSource + ?Sized> ArchiveWriter<'a, L> {
    /// Create a writer reading from `ledger` with the limits in `config`
    pub fn new(ledger: &'a L, config: &Config) -> Self {
        Self {
            ledger,
            max_block_size: config.max_block_size,
            sync_strategy: config.sync_strategy,
        }
    }

    /// Append blocks `(last_saved_id, last_saved_id + min_batch]`
    ///
    /// Does nothing unless the ledger is at least `min_batch` blocks past the
    /// last archived id. A failed write leaves the frames written so far on
    /// disk; the next call resumes after the last complete one.
    pub fn append_new_blocks(&self, path: &Path, min_batch: u64) -> Result<AppendSummary> {
        let last_saved_id = locate_last(path, &self.max_block_size)?
            .map(|record| record.id)
            .unwrap_or(0);
        let chain_height = self.ledger.chain_height()?;

        let mut summary = AppendSummary {
            last_saved_id,
            chain_height,
            written: 0,
            first_written_id: None,
            last_written_id: None,
        };

        match chain_height.checked_sub(min_batch) {
            Some(threshold) if threshold >= last_saved_id => {}
            _ => {
                tracing::trace!(last_saved_id, chain_height, min_batch, "batch not ready");
                return Ok(summary);
            }
        }

        let up_to = last_saved_id.saturating_add(min_batch);
        let blocks = self.ledger.blocks(last_saved_id, up_to)?;
        self.check_batch(&blocks, last_saved_id, up_to)?;
        if blocks.is_empty() {
            return Ok(summary);
        }
        summary.first_written_id = blocks.first().map(|block| block.id);

        let mut out = BufWriter::new(open_for_append(path)?);
        for block in &blocks {
            let frame = codec::encode(block)?;
            out.write_all(&frame)?;

            if self.sync_strategy == SyncStrategy::EveryBlock {
                out.flush()?;
                out.get_ref().sync_data()?;
            }

            summary.written += 1;
            summary.last_written_id = Some(block.id);
        }

        out.flush()?;
        if self.sync_strategy == SyncStrategy::EveryBatch {
            out.get_ref().sync_data()?;
        }

        Ok(summary)
    }

    /// Reject a batch that would break the archive before writing any of it
    fn check_batch(&self, blocks: &[BlockRecord], last_saved_id: u64, up_to: u64) -> Result<()> {
        let mut previous = last_saved_id;
        for block in blocks {
            if block.id <= previous {
                return Err(ArchiveError::OutOfOrder {
                    previous,
                    found: block.id,
                });
            }
            if block.id > up_to {
                return Err(ArchiveError::Ledger(format!(
                    "block {} outside requested range ({}, {}]",
                    block.id, last_saved_id, up_to
                )));
            }
            if block.id > MAX_WORD {
                return Err(FormatError::WordOverflow(block.id).into());
            }

            let size = block.payload_len() as u64;
            if size > self.max_block_size {
                return Err(FormatError::LimitExceeded {
                    size,
                    max: self.max_block_size,
                }
                .into());
            }
            previous = block.id;
        }
        Ok(())
    }
}

fn open_for_append(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}
