//! Configuration for blockarchive
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::archive::MAX_WORD;
use crate::error::{ArchiveError, Result};
use crate::ledger::BlockSizeLimit;

/// Default upper bound for a block payload (64 MB)
pub const DEFAULT_MAX_BLOCK_SIZE: u64 = 64 * 1024 * 1024;

/// Main configuration for an archive job
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Archive Configuration
    // -------------------------------------------------------------------------
    /// Path of the archive file
    pub archive_path: PathBuf,

    /// Sync strategy: when to fsync appended frames
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Catch-up Configuration
    // -------------------------------------------------------------------------
    /// Number of blocks archived per cycle. A cycle only runs once the chain
    /// is at least this many blocks ahead of the archive.
    pub min_batch: u64,

    /// Largest block payload accepted, in bytes
    pub max_block_size: u64,

    /// Time between catch-up cycles
    pub interval: Duration,
}

/// Archive sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every frame (safest, slowest)
    EveryBlock,

    /// fsync once after the whole batch
    EveryBatch,

    /// Flush to the OS and let it decide when to persist
    OsManaged,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from("./blockchain.archive"),
            sync_strategy: SyncStrategy::EveryBatch,
            min_batch: 100,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            interval: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the values against what the archive format can represent
    pub fn validate(&self) -> Result<()> {
        if self.min_batch == 0 {
            return Err(ArchiveError::Config("min_batch must be at least 1".to_string()));
        }
        if self.max_block_size == 0 || self.max_block_size > MAX_WORD {
            return Err(ArchiveError::Config(format!(
                "max_block_size must be in 1..={}, got {}",
                MAX_WORD, self.max_block_size
            )));
        }
        if self.interval.is_zero() {
            return Err(ArchiveError::Config("interval must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl BlockSizeLimit for Config {
    fn max_block_size(&self) -> u64 {
        self.max_block_size
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the archive file path
    pub fn archive_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.archive_path = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the number of blocks archived per cycle
    pub fn min_batch(mut self, count: u64) -> Self {
        self.config.min_batch = count;
        self
    }

    /// Set the maximum block payload size (in bytes)
    pub fn max_block_size(mut self, size: u64) -> Self {
        self.config.max_block_size = size;
        self
    }

    /// Set the time between catch-up cycles
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
