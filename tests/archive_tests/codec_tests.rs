//! Tests for the archive frame codec
//!
//! These tests verify:
//! - Exact frame layout (header, id, length prefix, payload, trailer)
//! - Round trips through encode/decode
//! - Limit and truncation checks in decode
//! - The zero-size sentinel

use blockarchive::archive::codec::{self, MAX_LENGTH_PREFIX};
use blockarchive::archive::{decode, encode, BlockRecord, MAX_WORD, WORD_SIZE};
use blockarchive::FormatError;
use proptest::prelude::*;

// =============================================================================
// Helper Functions
// =============================================================================

/// The bytes between the header and trailer of a frame
fn body_of(frame: &[u8]) -> &[u8] {
    &frame[WORD_SIZE..frame.len() - WORD_SIZE]
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_encode_layout() {
    let record = BlockRecord::new(1, &b"abc"[..]);
    let frame = encode(&record).unwrap();

    let expected: Vec<u8> = [
        &[0, 0, 0, 0, 9][..], // body size: id (5) + prefix (1) + payload (3)
        &[0, 0, 0, 0, 1][..], // id
        &[3][..],             // length prefix
        &b"abc"[..],          // payload
        &[0, 0, 0, 0, 9][..], // trailer
    ]
    .concat();

    assert_eq!(&frame[..], &expected[..]);
}

#[test]
fn test_header_and_trailer_identical() {
    let record = BlockRecord::new(0x01_0203_0405, vec![7u8; 300]);
    let frame = encode(&record).unwrap();

    assert_eq!(&frame[..WORD_SIZE], &frame[frame.len() - WORD_SIZE..]);
    assert_eq!(&frame[WORD_SIZE..2 * WORD_SIZE], &[0x01, 0x02, 0x03, 0x04, 0x05]);
}

#[test]
fn test_encoded_length() {
    for len in [0usize, 1, 127, 128, 300, 70_000] {
        let record = BlockRecord::new(42, vec![0xab; len]);
        let frame = encode(&record).unwrap();

        let expected = 2 * WORD_SIZE + WORD_SIZE + codec::length_prefix_len(len as u64) + len;
        assert_eq!(frame.len(), expected, "payload len {}", len);
    }
}

#[test]
fn test_long_payload_uses_multibyte_prefix() {
    let record = BlockRecord::new(5, vec![1u8; 0x1234]);
    let frame = encode(&record).unwrap();

    assert_eq!(&frame[2 * WORD_SIZE..2 * WORD_SIZE + 3], &[0x82, 0x12, 0x34]);
}

#[test]
fn test_encode_rejects_wide_id() {
    let record = BlockRecord::new(MAX_WORD + 1, &b"x"[..]);
    assert_eq!(encode(&record), Err(FormatError::WordOverflow(MAX_WORD + 1)));
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_roundtrip_empty_payload() {
    let record = BlockRecord::new(9, Vec::new());
    let frame = encode(&record).unwrap();

    assert_eq!(decode(body_of(&frame), 1024).unwrap(), Some(record));
}

#[test]
fn test_roundtrip_payload_at_limit() {
    let record = BlockRecord::new(MAX_WORD, vec![0x5a; 4096]);
    let frame = encode(&record).unwrap();

    assert_eq!(decode(body_of(&frame), 4096).unwrap(), Some(record));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_frame_roundtrip(
        id in 0u64..=MAX_WORD,
        payload in proptest::collection::vec(any::<u8>(), 0..600),
    ) {
        let record = BlockRecord::new(id, payload);
        let frame = encode(&record).unwrap();
        prop_assert_eq!(decode(body_of(&frame), 600).unwrap(), Some(record));
    }
}

// =============================================================================
// Decode Error Tests
// =============================================================================

#[test]
fn test_decode_empty_body_is_sentinel() {
    assert_eq!(decode(&[], 1024).unwrap(), None);
}

#[test]
fn test_decode_oversized_payload() {
    // id 7, then a 4-byte length prefix declaring 1 GiB with no payload behind it
    let body = [0, 0, 0, 0, 7, 0x84, 0x40, 0x00, 0x00, 0x00];

    assert_eq!(
        decode(&body, 1024),
        Err(FormatError::LimitExceeded { size: 1 << 30, max: 1024 })
    );
}

#[test]
fn test_decode_payload_longer_than_body() {
    let record = BlockRecord::new(3, &b"hello world"[..]);
    let frame = encode(&record).unwrap();
    let body = body_of(&frame);

    assert_eq!(
        decode(&body[..body.len() - 4], 1024),
        Err(FormatError::Truncated { needed: 11, available: 7 })
    );
}

#[test]
fn test_decode_body_shorter_than_id() {
    assert_eq!(
        decode(&[0, 0, 1], 1024),
        Err(FormatError::Truncated { needed: WORD_SIZE as u64, available: 3 })
    );
}

#[test]
fn test_decode_missing_length_prefix() {
    assert!(matches!(
        decode(&[0, 0, 0, 0, 1], 1024),
        Err(FormatError::Truncated { .. })
    ));
}

#[test]
fn test_decode_invalid_prefix() {
    let body = [0, 0, 0, 0, 1, 0x8a];
    assert_eq!(decode(&body, 1024), Err(FormatError::InvalidLengthPrefix(0x8a)));
}

#[test]
fn test_decode_ignores_bytes_after_payload() {
    let record = BlockRecord::new(11, &b"data"[..]);
    let frame = encode(&record).unwrap();

    // Header stripped, trailer left in place
    assert_eq!(decode(&frame[WORD_SIZE..], 1024).unwrap(), Some(record));
}

#[test]
fn test_max_body_size_covers_largest_frame() {
    let record = BlockRecord::new(1, vec![0u8; 1000]);
    let frame = encode(&record).unwrap();
    let body_size = (frame.len() - 2 * WORD_SIZE) as u64;

    assert!(body_size <= codec::max_body_size(1000));
    assert_eq!(codec::max_body_size(1000), 1000 + (WORD_SIZE + MAX_LENGTH_PREFIX) as u64);
}
