//! Error types for blockarchive
//!
//! Two layers: [`FormatError`] for problems with the bytes of a frame, and
//! [`ArchiveError`] for everything an archive operation can fail with.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using ArchiveError
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors in the on-disk framing of an archive
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The archive file exists but holds zero bytes
    #[error("archive file is empty")]
    Empty,

    /// A declared size runs past the bytes that are actually available
    #[error("truncated frame: need {needed} bytes, only {available} available")]
    Truncated { needed: u64, available: u64 },

    /// A declared size is larger than the configured maximum
    #[error("declared size {size} exceeds limit {max}")]
    LimitExceeded { size: u64, max: u64 },

    /// Header and trailer size words of one frame disagree
    #[error("frame at offset {offset}: header size {header} != trailer size {trailer}")]
    SizeMismatch { offset: u64, header: u64, trailer: u64 },

    #[error("invalid length prefix byte 0x{0:02x}")]
    InvalidLengthPrefix(u8),

    /// Value does not fit in a single fixed-width word
    #[error("value {0} does not fit in a frame word")]
    WordOverflow(u64),
}

/// Unified error type for archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archive not found: {}", .0.display())]
    NotFound(PathBuf),

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("archive format error: {0}")]
    Format(#[from] FormatError),

    #[error("block {found} is out of order (previous {previous})")]
    OutOfOrder { previous: u64, found: u64 },

    // -------------------------------------------------------------------------
    // Ledger Errors
    // -------------------------------------------------------------------------
    #[error("ledger error: {0}")]
    Ledger(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArchiveError {
    /// Short, stable name of the error kind for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ArchiveError::Io(_) => "io",
            ArchiveError::NotFound(_) => "not_found",
            ArchiveError::Format(FormatError::Empty) => "empty",
            ArchiveError::Format(FormatError::Truncated { .. }) => "truncated",
            ArchiveError::Format(FormatError::LimitExceeded { .. }) => "limit_exceeded",
            ArchiveError::Format(FormatError::SizeMismatch { .. }) => "size_mismatch",
            ArchiveError::Format(FormatError::InvalidLengthPrefix(_)) => "invalid_length_prefix",
            ArchiveError::Format(FormatError::WordOverflow(_)) => "word_overflow",
            ArchiveError::OutOfOrder { .. } => "out_of_order",
            ArchiveError::Ledger(_) => "ledger",
            ArchiveError::Config(_) => "config",
        }
    }

    /// Whether retrying on the next cycle may succeed.
    ///
    /// I/O and ledger failures are transient; anything wrong with the bytes
    /// already on disk, or with the configuration, needs an operator.
    pub fn is_transient(&self) -> bool {
        matches!(self, ArchiveError::Io(_) | ArchiveError::Ledger(_))
    }
}
