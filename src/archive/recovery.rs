//! Archive Recovery
//!
//! Whole-file integrity checks. Never modifies the archive.

use std::path::Path;

use crate::error::{FormatError, Result};
use crate::ledger::BlockSizeLimit;
use super::{ArchiveReader, BlockRecord};

/// Reads and checks every frame of an archive
pub struct ArchiveRecovery;

/// Result of scanning an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Number of complete records
    pub records: u64,

    /// Id of the first complete record
    pub first_id: Option<u64>,

    /// Id of the last complete record
    pub last_id: Option<u64>,

    /// Records whose id is not greater than the one before
    pub out_of_order: u64,

    /// Bytes after the last complete frame
    pub torn_tail_bytes: u64,
}

impl VerifyReport {
    /// No ordering violations and no trailing partial frame
    pub fn is_clean(&self) -> bool {
        self.out_of_order == 0 && self.torn_tail_bytes == 0
    }
}

impl ArchiveRecovery {
    /// Read all complete records of an archive
    ///
    /// This will:
    /// 1. Read frames front to back
    /// 2. Count ids that break the ascending order
    /// 3. Stop at a partially written tail and report its size
    /// 4. Return all complete records in file order
    pub fn recover<L: BlockSizeLimit + ?Sized>(
        path: &Path,
        limits: &L,
    ) -> Result<(Vec<BlockRecord>, VerifyReport)> {
        let mut records = Vec::new();
        let report = scan(path, limits, |record| records.push(record))?;
        Ok((records, report))
    }

    /// Check an archive without keeping the records
    pub fn verify<L: BlockSizeLimit + ?Sized>(path: &Path, limits: &L) -> Result<VerifyReport> {
        scan(path, limits, drop)
    }
}

fn scan<L, F>(path: &Path, limits: &L, mut visit: F) -> Result<VerifyReport>
where
    L: BlockSizeLimit + ?Sized,
    F: FnMut(BlockRecord),
{
    let mut reader = ArchiveReader::open(path, limits)?;
    if reader.is_empty() {
        return Err(FormatError::Empty.into());
    }

    let mut report = VerifyReport::default();
    while let Some(record) = reader.next_record()? {
        if let Some(previous) = report.last_id {
            if record.id <= previous {
                tracing::debug!(previous, found = record.id, "archive record out of order");
                report.out_of_order += 1;
            }
        }

        report.records += 1;
        if report.first_id.is_none() {
            report.first_id = Some(record.id);
        }
        report.last_id = Some(record.id);
        visit(record);
    }

    report.torn_tail_bytes = reader.torn_tail().map(|tail| tail.available).unwrap_or(0);
    Ok(report)
}
