//! Reverse Locator
//!
//! Finds the last record of an archive by reading from end-of-file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{ArchiveError, FormatError, Result};
use crate::ledger::BlockSizeLimit;
use super::codec::{self, WORD_SIZE};
use super::{ArchiveReader, BlockRecord};

/// Candidate frame ends examined per read of the backward search
const SEARCH_CHUNK: u64 = 64 * 1024;

/// Outcome of reading the frame that ends at end-of-file
enum Tail {
    Complete(BlockRecord),

    /// The trailing bytes are not a whole frame; carries the reason
    Torn(&'static str),
}

/// Find the last complete record in an archive
///
/// - `Ok(None)`: the file does not exist (empty archive)
/// - `Err(Format(Empty))`: the file exists with zero length
///
/// Normally this is two seeks and two small reads. If the end of the file is
/// a partially written frame, the last self-consistent frame is searched for
/// backward from end-of-file. Bytes left by earlier crashes further back in
/// the file are never read. Only when no such frame exists is the file
/// scanned forward, to report why.
pub fn locate_last<L: BlockSizeLimit + ?Sized>(
    path: &Path,
    limits: &L,
) -> Result<Option<BlockRecord>> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let len = file.metadata()?.len();
    if len == 0 {
        return Err(FormatError::Empty.into());
    }

    match read_tail(&mut file, len, limits.max_block_size())? {
        Tail::Complete(record) => Ok(Some(record)),
        Tail::Torn(reason) => {
            tracing::debug!(
                path = %path.display(),
                len,
                reason,
                "archive tail is not a complete frame, searching backward"
            );
            if let Some(record) = search_back(&mut file, len, limits.max_block_size())? {
                return Ok(Some(record));
            }
            drop(file);
            scan_last(path, limits).map(Some)
        }
    }
}

/// Read the frame whose trailer is the last word of the file
fn read_tail(file: &mut File, len: u64, max_payload: u64) -> Result<Tail> {
    if len < WORD_SIZE as u64 {
        return Ok(Tail::Torn("file shorter than one word"));
    }

    file.seek(SeekFrom::End(-(WORD_SIZE as i64)))?;
    let trailer = read_word(file)?;
    if trailer == 0 {
        return Ok(Tail::Torn("zero trailer"));
    }
    if trailer > codec::max_body_size(max_payload) {
        return Ok(Tail::Torn("trailer exceeds size limit"));
    }

    // Step back over the body and the header from the start of the trailer
    let Some(header_offset) = (len - WORD_SIZE as u64).checked_sub(trailer + WORD_SIZE as u64)
    else {
        return Ok(Tail::Torn("trailer points before start of file"));
    };

    file.seek(SeekFrom::Start(header_offset))?;
    let header = read_word(file)?;
    if header != trailer {
        return Ok(Tail::Torn("header does not match trailer"));
    }

    let mut body = vec![0u8; trailer as usize];
    file.read_exact(&mut body)?;
    let record = codec::decode_record(&body, max_payload)?;
    Ok(Tail::Complete(record))
}

/// Find the last self-consistent frame ending near end-of-file
///
/// A crash leaves at most one partial frame behind the last complete one, so
/// only frame ends within one maximum frame length of end-of-file are tried.
fn search_back(file: &mut File, len: u64, max_payload: u64) -> Result<Option<BlockRecord>> {
    let max_body = codec::max_body_size(max_payload);
    let lowest_end = len
        .saturating_sub(codec::frame_len(max_body))
        .max(codec::MIN_FRAME_SIZE);

    let mut hi = len;
    while hi >= lowest_end {
        let lo = hi.saturating_sub(SEARCH_CHUNK - 1).max(lowest_end);

        // Trailer words of the frames ending in lo..=hi
        let start = lo - WORD_SIZE as u64;
        let mut window = vec![0u8; (hi - start) as usize];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut window)?;

        for end in (lo..=hi).rev() {
            let at = (end - lo) as usize;
            let mut word = [0u8; WORD_SIZE];
            word.copy_from_slice(&window[at..at + WORD_SIZE]);

            let size = codec::decode_word(word);
            if size == 0 || size > max_body {
                continue;
            }
            if let Some(record) = frame_ending_at(file, end, size, max_payload)? {
                tracing::debug!(end, id = record.id, "found last complete frame");
                return Ok(Some(record));
            }
        }

        if lo == lowest_end {
            break;
        }
        hi = lo - 1;
    }

    Ok(None)
}

/// The record of the frame that ends at `end` with trailer `size`, if the
/// bytes there form one exactly
fn frame_ending_at(
    file: &mut File,
    end: u64,
    size: u64,
    max_payload: u64,
) -> Result<Option<BlockRecord>> {
    let Some(header_offset) = (end - WORD_SIZE as u64).checked_sub(size + WORD_SIZE as u64)
    else {
        return Ok(None);
    };

    file.seek(SeekFrom::Start(header_offset))?;
    if read_word(file)? != size {
        return Ok(None);
    }

    let mut body = vec![0u8; size as usize];
    file.read_exact(&mut body)?;
    match codec::decode_record(&body, max_payload) {
        Ok(record) if codec::body_size(record.payload_len() as u64) == size => Ok(Some(record)),
        _ => Ok(None),
    }
}

/// Forward scan returning the last complete record
fn scan_last<L: BlockSizeLimit + ?Sized>(path: &Path, limits: &L) -> Result<BlockRecord> {
    let mut reader = ArchiveReader::open(path, limits)?;
    let mut last = None;
    while let Some(record) = reader.next_record()? {
        last = Some(record);
    }

    match (last, reader.torn_tail()) {
        (Some(record), _) => Ok(record),
        (None, Some(tail)) => Err(FormatError::Truncated {
            needed: tail.needed,
            available: tail.available,
        }
        .into()),
        (None, None) => Err(ArchiveError::Format(FormatError::Empty)),
    }
}

fn read_word(file: &mut File) -> Result<u64> {
    let mut word = [0u8; WORD_SIZE];
    file.read_exact(&mut word)?;
    Ok(codec::decode_word(word))
}
