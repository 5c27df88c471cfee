//! Archive frame codec
//!
//! Encoding and decoding functions for a single archive frame. No I/O.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬────────────┬─────────────┬──────────┐
//! │ Size (5) │  ID (5)  │ Len (1..9) │   Payload   │ Size (5) │
//! └──────────┴──────────┴────────────┴─────────────┴──────────┘
//!            └──────────────── Size bytes ────────┘
//! ```
//!
//! Both size words hold the same value, so a frame can be found from either
//! end. Words are unsigned big-endian.
//!
//! ### Length prefix
//! - `0x00..=0x7f`: the payload length itself
//! - `0x80 | n`: followed by `n` (1..=8) big-endian bytes of payload length

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::FormatError;
use super::BlockRecord;

/// Width of a size or id word in bytes
pub const WORD_SIZE: usize = 5;

/// Largest value a word can hold
pub const MAX_WORD: u64 = (1 << (8 * WORD_SIZE)) - 1;

/// Longest possible payload length prefix
pub const MAX_LENGTH_PREFIX: usize = 9;

/// Smallest frame that can hold a record (empty payload)
pub const MIN_FRAME_SIZE: u64 = (3 * WORD_SIZE + 1) as u64;

// =============================================================================
// Words
// =============================================================================

/// Append `value` as one big-endian word
pub fn put_word<B: BufMut>(buf: &mut B, value: u64) -> Result<(), FormatError> {
    if value > MAX_WORD {
        return Err(FormatError::WordOverflow(value));
    }
    buf.put_uint(value, WORD_SIZE);
    Ok(())
}

/// Interpret one word
pub fn decode_word(word: [u8; WORD_SIZE]) -> u64 {
    (&word[..]).get_uint(WORD_SIZE)
}

/// Largest size word a frame may declare for the given payload bound
pub fn max_body_size(max_payload: u64) -> u64 {
    max_payload.saturating_add((WORD_SIZE + MAX_LENGTH_PREFIX) as u64)
}

/// Body size of the frame holding a payload of `payload_len` bytes
pub fn body_size(payload_len: u64) -> u64 {
    (WORD_SIZE + length_prefix_len(payload_len)) as u64 + payload_len
}

/// Total frame length for a declared body size
pub fn frame_len(body_size: u64) -> u64 {
    body_size.saturating_add(2 * WORD_SIZE as u64)
}

// =============================================================================
// Length Prefix
// =============================================================================

/// Number of bytes the length prefix for `len` takes
pub fn length_prefix_len(len: u64) -> usize {
    if len <= 0x7f {
        1
    } else {
        1 + significant_bytes(len)
    }
}

fn significant_bytes(value: u64) -> usize {
    8 - (value.leading_zeros() / 8) as usize
}

fn put_length<B: BufMut>(buf: &mut B, len: u64) {
    if len <= 0x7f {
        buf.put_u8(len as u8);
        return;
    }

    let n = significant_bytes(len);
    buf.put_u8(0x80 | n as u8);
    buf.put_uint(len, n);
}

/// Decode a length prefix, advancing `buf` past it
fn take_length(buf: &mut &[u8]) -> Result<u64, FormatError> {
    let Some((&first, rest)) = buf.split_first() else {
        return Err(FormatError::Truncated { needed: 1, available: 0 });
    };

    if first & 0x80 == 0 {
        *buf = rest;
        return Ok(first as u64);
    }

    let n = (first & 0x7f) as usize;
    if n > 8 {
        return Err(FormatError::InvalidLengthPrefix(first));
    }
    if rest.len() < n {
        return Err(FormatError::Truncated {
            needed: (n + 1) as u64,
            available: buf.len() as u64,
        });
    }

    let (mut digits, rest) = rest.split_at(n);
    let len = digits.get_uint(n);
    *buf = rest;
    Ok(len)
}

// =============================================================================
// Frames
// =============================================================================

/// Encode a record into one complete frame
///
/// Fails only if the id (or the body size) does not fit in a word.
pub fn encode(record: &BlockRecord) -> Result<Bytes, FormatError> {
    let payload_len = record.payload.len() as u64;
    let size = body_size(payload_len);

    let mut buf = BytesMut::with_capacity(frame_len(size) as usize);
    put_word(&mut buf, size)?;
    put_word(&mut buf, record.id)?;
    put_length(&mut buf, payload_len);
    buf.put_slice(&record.payload);
    put_word(&mut buf, size)?;

    Ok(buf.freeze())
}

/// Decode a frame body (the bytes between the two size words)
///
/// An empty body is the zero-size sentinel and decodes to `None`.
pub fn decode(body: &[u8], max_payload_size: u64) -> Result<Option<BlockRecord>, FormatError> {
    if body.is_empty() {
        return Ok(None);
    }
    decode_record(body, max_payload_size).map(Some)
}

/// Decode a non-empty frame body
///
/// Bytes after the payload are ignored; trailer checks belong to callers
/// that navigate the file.
pub fn decode_record(body: &[u8], max_payload_size: u64) -> Result<BlockRecord, FormatError> {
    if body.len() < WORD_SIZE {
        return Err(FormatError::Truncated {
            needed: WORD_SIZE as u64,
            available: body.len() as u64,
        });
    }

    let mut rest = body;
    let id = rest.get_uint(WORD_SIZE);
    let payload_len = take_length(&mut rest)?;

    // Check the bound before touching the payload
    if payload_len > max_payload_size {
        return Err(FormatError::LimitExceeded {
            size: payload_len,
            max: max_payload_size,
        });
    }
    if payload_len > rest.len() as u64 {
        return Err(FormatError::Truncated {
            needed: payload_len,
            available: rest.len() as u64,
        });
    }

    let payload = Bytes::copy_from_slice(&rest[..payload_len as usize]);
    Ok(BlockRecord { id, payload })
}
