//! Block Archive Module
//!
//! Append-only flat file of historical ledger blocks.
//!
//! ## Responsibilities
//! - Encode blocks into self-describing frames
//! - Find the last archived block in O(1) by reading from the end
//! - Append the next batch of ledger blocks (catch-up)
//! - Backward search past a torn tail, forward scans for verification
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Frame 1                                      │
//! │ ┌────────┬───────┬─────────┬──────┬────────┐ │
//! │ │Size (5)│ID (5) │Len (var)│ Data │Size (5)│ │
//! │ └────────┴───────┴─────────┴──────┴────────┘ │
//! ├──────────────────────────────────────────────┤
//! │ Frame 2                                      │
//! │ ┌────────┬───────┬─────────┬──────┬────────┐ │
//! │ │Size (5)│ID (5) │Len (var)│ Data │Size (5)│ │
//! │ └────────┴───────┴─────────┴──────┴────────┘ │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The trailing size word lets a reader step from end-of-file straight to the
//! header of the last frame. There is no separate index.

mod record;
pub mod codec;
mod reader;
mod locator;
mod recovery;
mod writer;

pub use record::BlockRecord;
pub use codec::{decode, encode, MAX_WORD, WORD_SIZE};
pub use reader::{ArchiveReader, Records, TornTail};
pub use locator::locate_last;
pub use recovery::{ArchiveRecovery, VerifyReport};
pub use writer::{AppendSummary, ArchiveWriter};
