//! Tests for ArchiveJob
//!
//! These tests verify:
//! - Config validation on construction
//! - Single cycles through run_once
//! - The periodic loop: shutdown, transient and persistent errors

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use blockarchive::archive::{locate_last, BlockRecord};
use blockarchive::config::{Config, SyncStrategy};
use blockarchive::ledger::{LedgerSource, MemoryLedger};
use blockarchive::{ArchiveError, ArchiveJob, FormatError, Result};
use crossbeam::channel;
use tempfile::TempDir;

const MAX: u64 = 1024;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_archive() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("blocks.archive");
    (temp_dir, path)
}

fn job_config(path: &Path, min_batch: u64) -> Config {
    Config::builder()
        .archive_path(path)
        .min_batch(min_batch)
        .max_block_size(MAX)
        .sync_strategy(SyncStrategy::OsManaged)
        .interval(Duration::from_millis(5))
        .build()
}

/// Ledger whose height query always fails, counting attempts
#[derive(Default)]
struct FlakyLedger {
    attempts: AtomicU64,
}

impl LedgerSource for FlakyLedger {
    fn chain_height(&self) -> Result<u64> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ArchiveError::Ledger("database unavailable".to_string()))
    }

    fn blocks(&self, _after: u64, _up_to: u64) -> Result<Vec<BlockRecord>> {
        Ok(Vec::new())
    }
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_new_rejects_invalid_config() {
    let (_temp, path) = setup_temp_archive();
    let config = job_config(&path, 0);

    let result = ArchiveJob::new(config, Arc::new(MemoryLedger::new()));
    assert!(matches!(result, Err(ArchiveError::Config(_))));
}

// =============================================================================
// run_once Tests
// =============================================================================

#[test]
fn test_run_once_archives_batch() {
    let (_temp, path) = setup_temp_archive();
    let job = ArchiveJob::new(job_config(&path, 10), Arc::new(MemoryLedger::with_height(25))).unwrap();

    let summary = job.run_once().unwrap();

    assert_eq!(summary.written, 10);
    assert_eq!(summary.first_written_id, Some(1));
    assert_eq!(locate_last(&path, &MAX).unwrap().unwrap().id, 10);
}

#[test]
fn test_run_once_returns_error() {
    let (_temp, path) = setup_temp_archive();
    File::create(&path).unwrap();
    let job = ArchiveJob::new(job_config(&path, 10), Arc::new(MemoryLedger::with_height(25))).unwrap();

    let err = job.run_once().unwrap_err();
    assert!(matches!(err, ArchiveError::Format(FormatError::Empty)));
}

// =============================================================================
// run Loop Tests
// =============================================================================

#[test]
fn test_run_stops_when_shutdown_dropped() {
    let (_temp, path) = setup_temp_archive();
    let job = ArchiveJob::new(job_config(&path, 10), Arc::new(MemoryLedger::with_height(25))).unwrap();

    let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
    drop(shutdown_tx);

    assert_eq!(job.run(&shutdown_rx).unwrap(), 1);
    assert_eq!(locate_last(&path, &MAX).unwrap().unwrap().id, 10);
}

#[test]
fn test_run_catches_up_until_shutdown() {
    let (_temp, path) = setup_temp_archive();
    let job = ArchiveJob::new(job_config(&path, 10), Arc::new(MemoryLedger::with_height(30))).unwrap();

    let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        shutdown_tx.send(()).unwrap();
    });

    let cycles = job.run(&shutdown_rx).unwrap();
    stopper.join().unwrap();

    // Three cycles archive 1..=30, later ones are no-ops
    assert!(cycles >= 4, "only {} cycles ran", cycles);
    assert_eq!(locate_last(&path, &MAX).unwrap().unwrap().id, 30);
}

#[test]
fn test_run_continues_after_transient_error() {
    let (_temp, path) = setup_temp_archive();
    let ledger = Arc::new(FlakyLedger::default());
    let job = ArchiveJob::new(job_config(&path, 10), Arc::clone(&ledger)).unwrap();

    let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        shutdown_tx.send(()).unwrap();
    });

    let cycles = job.run(&shutdown_rx).unwrap();
    stopper.join().unwrap();

    assert!(cycles >= 2, "only {} cycles ran", cycles);
    assert_eq!(ledger.attempts.load(Ordering::SeqCst), cycles);
}

#[test]
fn test_run_stops_on_persistent_error() {
    let (_temp, path) = setup_temp_archive();
    File::create(&path).unwrap();
    let job = ArchiveJob::new(job_config(&path, 10), Arc::new(MemoryLedger::with_height(25))).unwrap();

    // Keep the sender alive: only the error may end the loop
    let (_shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);

    let err = job.run(&shutdown_rx).unwrap_err();
    assert!(matches!(err, ArchiveError::Format(FormatError::Empty)));
}
