//! Archive Job
//!
//! Periodic driver around [`ArchiveWriter`]. This is where errors are logged:
//! the archive core only returns them.
//!
//! ## Error policy
//! - Transient (`Io`, `Ledger`): logged, retried on the next tick
//! - Persistent (format, ordering, config): logged, the job stops

use std::sync::Arc;

use crossbeam::channel::{self, Receiver, TryRecvError};

use crate::archive::{AppendSummary, ArchiveWriter};
use crate::config::Config;
use crate::error::Result;
use crate::ledger::LedgerSource;

/// Runs catch-up cycles for one archive file
pub struct ArchiveJob<L: LedgerSource + ?Sized> {
    config: Config,
    ledger: Arc<L>,
}

impl<L: LedgerSource + ?Sized> ArchiveJob<L> {
    /// Create a job; fails if the config is invalid
    pub fn new(config: Config, ledger: Arc<L>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, ledger })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a single catch-up cycle
    pub fn run_once(&self) -> Result<AppendSummary> {
        let span = tracing::info_span!(
            "archive_cycle",
            path = %self.config.archive_path.display(),
            op = "append_new_blocks",
        );
        let _enter = span.enter();

        let writer = ArchiveWriter::new(self.ledger.as_ref(), &self.config);
        match writer.append_new_blocks(&self.config.archive_path, self.config.min_batch) {
            Ok(summary) => {
                if summary.is_noop() {
                    tracing::debug!(
                        last_saved_id = summary.last_saved_id,
                        chain_height = summary.chain_height,
                        "nothing to archive"
                    );
                } else {
                    tracing::info!(
                        written = summary.written,
                        from = summary.first_written_id,
                        to = summary.last_written_id,
                        "archived blocks"
                    );
                }
                Ok(summary)
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(kind = e.kind(), error = %e, "archive cycle failed, will retry");
                Err(e)
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "archive cycle failed, stopping");
                Err(e)
            }
        }
    }

    /// Run a cycle now and then once per `config.interval` (blocking)
    ///
    /// Returns the number of cycles run once `shutdown` receives a message or
    /// its sender is dropped. Returns the error of the first cycle that fails
    /// persistently.
    pub fn run(&self, shutdown: &Receiver<()>) -> Result<u64> {
        let ticker = channel::tick(self.config.interval);
        let mut cycles = 0u64;

        loop {
            match self.run_once() {
                Ok(_) => {}
                Err(e) if e.is_transient() => {}
                Err(e) => return Err(e),
            }
            cycles += 1;

            channel::select! {
                recv(shutdown) -> _ => break,
                recv(ticker) -> _ => {
                    // A pending shutdown wins over a tick that fired at the same time
                    if !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)) {
                        break;
                    }
                }
            }
        }

        tracing::info!(cycles, "archive job stopped");
        Ok(cycles)
    }
}
