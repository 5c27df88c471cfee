//! # blockarchive
//!
//! Append-only archive of historical ledger blocks with:
//! - Self-describing frames readable from either end
//! - O(1) lookup of the last archived block
//! - Batched, crash-safe catch-up from a live ledger
//! - Torn-tail tolerant recovery scans
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ArchiveJob                              │
//! │            (periodic cycles, logging, error policy)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   ArchiveWriter                              │
//! │        (last saved id → ledger batch → append frames)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Locator   │          │   Ledger    │
//!   │ (from EOF)  │          │  (source)   │
//!   └──────┬──────┘          └─────────────┘
//!          │
//!          ▼
//!   ┌─────────────┐
//!   │    Codec    │
//!   │  (frames)   │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod archive;
pub mod ledger;
pub mod job;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ArchiveError, FormatError, Result};
pub use config::{Config, SyncStrategy};
pub use archive::{locate_last, ArchiveWriter, BlockRecord};
pub use job::ArchiveJob;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of blockarchive
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
