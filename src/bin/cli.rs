//! blockarchive CLI
//!
//! Command-line interface for inspecting archive files.
//!
//! Exit codes: 0 on success, 1 on error, 2 when `verify` finds records out of
//! order.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use blockarchive::archive::{locate_last, ArchiveReader, ArchiveRecovery};
use blockarchive::config::DEFAULT_MAX_BLOCK_SIZE;
use blockarchive::{Result, VERSION};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

const EXIT_ERROR: i32 = 1;
const EXIT_OUT_OF_ORDER: i32 = 2;

/// blockarchive CLI
#[derive(Parser, Debug)]
#[command(name = "blockarchive")]
#[command(about = "Inspect append-only block archives")]
#[command(version = VERSION)]
struct Args {
    /// Largest block payload accepted, in bytes
    #[arg(short, long, default_value_t = DEFAULT_MAX_BLOCK_SIZE)]
    max_block_size: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the last archived block
    Last {
        /// Archive file
        path: PathBuf,
    },

    /// Check every frame of an archive
    Verify {
        /// Archive file
        path: PathBuf,
    },

    /// List archived blocks in file order
    List {
        /// Archive file
        path: PathBuf,

        /// Stop after this many blocks
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,blockarchive=info"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let outcome = execute(&args.command, args.max_block_size, &mut io::stdout());
    if let Err(e) = &outcome {
        tracing::error!(kind = e.kind(), "{}", e);
    }

    let code = exit_code(&outcome);
    if code != 0 {
        std::process::exit(code);
    }
}

/// Run one command, writing its report to `out`
///
/// `Ok(false)` means the command ran but found a problem worth a non-zero
/// exit.
fn execute<W: Write>(command: &Commands, max_block_size: u64, out: &mut W) -> Result<bool> {
    match command {
        Commands::Last { path } => last(path, max_block_size, out),
        Commands::Verify { path } => verify(path, max_block_size, out),
        Commands::List { path, limit } => list(path, max_block_size, *limit, out),
    }
}

fn exit_code(outcome: &Result<bool>) -> i32 {
    match outcome {
        Ok(true) => 0,
        Ok(false) => EXIT_OUT_OF_ORDER,
        Err(_) => EXIT_ERROR,
    }
}

fn last<W: Write>(path: &Path, max_block_size: u64, out: &mut W) -> Result<bool> {
    match locate_last(path, &max_block_size)? {
        Some(record) => writeln!(out, "last block: id={} size={}", record.id, record.payload_len())?,
        None => writeln!(out, "archive is empty")?,
    }
    Ok(true)
}

fn verify<W: Write>(path: &Path, max_block_size: u64, out: &mut W) -> Result<bool> {
    let report = ArchiveRecovery::verify(path, &max_block_size)?;

    writeln!(out, "records:         {}", report.records)?;
    writeln!(out, "first id:        {}", fmt_id(report.first_id))?;
    writeln!(out, "last id:         {}", fmt_id(report.last_id))?;
    writeln!(out, "out of order:    {}", report.out_of_order)?;
    writeln!(out, "torn tail bytes: {}", report.torn_tail_bytes)?;

    Ok(report.out_of_order == 0)
}

fn list<W: Write>(
    path: &Path,
    max_block_size: u64,
    limit: Option<usize>,
    out: &mut W,
) -> Result<bool> {
    let records = ArchiveReader::open(path, &max_block_size)?.records();
    for record in records.take(limit.unwrap_or(usize::MAX)) {
        let record = record?;
        writeln!(out, "{}\t{}", record.id, record.payload_len())?;
    }
    Ok(true)
}

fn fmt_id(id: Option<u64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}
