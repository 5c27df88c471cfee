//! Archive Reader
//!
//! Sequential, front-to-back scan of an archive file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ArchiveError, FormatError, Result};
use crate::ledger::BlockSizeLimit;
use super::codec::{self, MIN_FRAME_SIZE, WORD_SIZE};
use super::BlockRecord;

/// Bytes at the end of an archive that do not form a complete frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TornTail {
    /// Offset where the incomplete frame starts
    pub offset: u64,

    /// Bytes the frame at `offset` needs to be complete
    pub needed: u64,

    /// Bytes actually present from `offset` to end-of-file
    pub available: u64,
}

/// Reads frames from the start of an archive file
pub struct ArchiveReader {
    reader: BufReader<File>,

    /// Offset just past the last complete frame
    position: u64,

    /// File length when opened
    len: u64,

    max_payload: u64,
    torn_tail: Option<TornTail>,
    done: bool,
}

impl ArchiveReader {
    /// Open an archive for reading
    pub fn open<L: BlockSizeLimit + ?Sized>(path: &Path, limits: &L) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArchiveError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let len = file.metadata()?.len();

        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            len,
            max_payload: limits.max_block_size(),
            torn_tail: None,
            done: false,
        })
    }

    /// Length of the file when it was opened
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset just past the last complete frame read so far
    pub fn position(&self) -> u64 {
        self.position
    }

    /// The incomplete frame that ended the scan, if any
    pub fn torn_tail(&self) -> Option<TornTail> {
        self.torn_tail
    }

    /// Read the next complete record
    ///
    /// Returns `Ok(None)` at the end of complete content: end-of-file, a
    /// zero size word, or a frame that runs past end-of-file. After `None`
    /// or an error, every later call returns `Ok(None)`.
    pub fn next_record(&mut self) -> Result<Option<BlockRecord>> {
        if self.done {
            return Ok(None);
        }

        let result = self.read_frame();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    /// Iterate over all complete records
    pub fn records(self) -> Records {
        Records { reader: self }
    }

    fn read_frame(&mut self) -> Result<Option<BlockRecord>> {
        let available = self.len - self.position;
        if available == 0 {
            return Ok(None);
        }
        if available < WORD_SIZE as u64 {
            return Ok(self.stop(MIN_FRAME_SIZE, available));
        }

        let size = self.read_word()?;
        if size == 0 {
            // Sentinel: nothing was written past this point
            return Ok(self.stop(MIN_FRAME_SIZE, available));
        }

        let max_body = codec::max_body_size(self.max_payload);
        if size > max_body {
            return Err(FormatError::LimitExceeded { size, max: max_body }.into());
        }

        let frame_len = codec::frame_len(size);
        if frame_len > available {
            return Ok(self.stop(frame_len, available));
        }

        let mut body = vec![0u8; size as usize];
        self.reader.read_exact(&mut body)?;

        let trailer = self.read_word()?;
        if trailer != size {
            return Err(FormatError::SizeMismatch {
                offset: self.position,
                header: size,
                trailer,
            }
            .into());
        }

        let record = codec::decode_record(&body, self.max_payload)?;
        self.position += frame_len;
        Ok(Some(record))
    }

    fn read_word(&mut self) -> Result<u64> {
        let mut word = [0u8; WORD_SIZE];
        self.reader.read_exact(&mut word)?;
        Ok(codec::decode_word(word))
    }

    fn stop(&mut self, needed: u64, available: u64) -> Option<BlockRecord> {
        self.torn_tail = Some(TornTail {
            offset: self.position,
            needed,
            available,
        });
        None
    }
}

/// Iterator over archive records
pub struct Records {
    reader: ArchiveReader,
}

impl Records {
    /// The incomplete frame that ended the scan, if any
    pub fn torn_tail(&self) -> Option<TornTail> {
        self.reader.torn_tail()
    }
}

impl Iterator for Records {
    type Item = Result<BlockRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next_record().transpose()
    }
}
