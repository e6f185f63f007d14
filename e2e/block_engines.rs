//! E2E Test Suite 03: Block Codec and Engines
//!
//! The raw block format and the sliding-window engines underneath the
//! frame layer:
//! - One-shot encode/decode at every level
//! - `compress_bound` sizing and undersized-destination retry
//! - Partial decode to a requested prefix
//! - Chained engine pairs streaming many blocks through window compaction

use lz4flow::block::{compress_bound, decompress, decompress_into};
use lz4flow::codec::{decode_block, encode_block};
use lz4flow::engine::{new_decoder, new_encoder, EncodedBlock};
use lz4flow::{Level, Lz4Error};

fn markov_text(bytes: usize) -> Vec<u8> {
    let words: [&[u8]; 8] = [
        b"window ", b"match ", b"offset ", b"literal ", b"token ", b"chain ", b"block ", b"frame ",
    ];
    let mut state = 7u32;
    let mut out = Vec::with_capacity(bytes + 8);
    while out.len() < bytes {
        state = state.wrapping_mul(2_654_435_761).wrapping_add(11);
        out.extend_from_slice(words[(state >> 28) as usize & 7]);
    }
    out.truncate(bytes);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: One-shot block round-trip at every level
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_block_roundtrip_every_level() {
    let src = markov_text(150_000);
    for level in [
        Level::Fast,
        Level::Hc3,
        Level::Hc6,
        Level::Hc9,
        Level::Opt10,
        Level::Opt11,
        Level::Max,
    ] {
        let mut dst = vec![0u8; compress_bound(src.len())];
        let encoded = encode_block(&src, &mut dst, level).expect("encode");
        assert!(encoded < src.len(), "{level:?} did not shrink");
        let mut out = vec![0u8; src.len()];
        let decoded = decode_block(&dst[..encoded], &mut out).expect("decode");
        assert_eq!(decoded, src.len());
        assert_eq!(out, src, "{level:?}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: Undersized destination fails cleanly, bound-sized retry succeeds
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_output_too_small_then_retry() {
    // Incompressible ramp: encoded form is larger than the source.
    let src: Vec<u8> = (0..4096u32).flat_map(|i| (i as u16).to_be_bytes()).collect();
    let mut tight = vec![0u8; src.len()];
    let err = encode_block(&src, &mut tight, Level::Fast).expect_err("must not fit");
    assert!(matches!(err, Lz4Error::OutputTooSmall));
    assert!(err.is_recoverable());

    let mut bound = vec![0u8; compress_bound(src.len())];
    let encoded = encode_block(&src, &mut bound, Level::Fast).expect("retry with bound");
    let mut out = vec![0u8; src.len()];
    assert_eq!(decode_block(&bound[..encoded], &mut out).expect("decode"), src.len());
    assert_eq!(out, src);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: Partial decode yields exactly the requested prefix
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_partial_decode_prefixes() {
    let src = markov_text(60_000);
    let mut dst = vec![0u8; compress_bound(src.len())];
    let encoded = encode_block(&src, &mut dst, Level::Hc9).expect("encode");

    for target in [0usize, 1, 100, 4_095, 59_999, 60_000] {
        let mut out = vec![0u8; target];
        let produced =
            decompress_into(&dst[..encoded], &mut out, 0, &[], Some(target)).expect("partial");
        assert_eq!(produced, target);
        assert_eq!(out, &src[..target], "prefix of {target}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: Chained engine pair across many blocks and compactions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_chained_engines_long_stream() {
    let src = markov_text(1_200_000);
    let block_size = 8 * 1024;
    for level in [Level::Fast, Level::Hc6] {
        let mut encoder = new_encoder(true, level, block_size, 0);
        let mut decoder = new_decoder(true, block_size);
        let mut dst = vec![0u8; compress_bound(block_size)];
        let mut out = Vec::with_capacity(src.len());
        let mut fed = 0;
        while fed < src.len() || encoder.bytes_ready() > 0 {
            let (consumed, block) = encoder
                .topup_and_encode(&src[fed..], &mut dst, fed >= src.len(), true)
                .expect("encode");
            fed += consumed;
            let produced = match block {
                EncodedBlock::None => continue,
                EncodedBlock::Copied(n) => decoder.inject(&dst[..n]).expect("inject"),
                EncodedBlock::Encoded(n) => decoder.decode(&dst[..n]).expect("decode"),
            };
            let mark = out.len();
            out.resize(mark + produced, 0);
            decoder
                .drain(&mut out[mark..], -(produced as isize))
                .expect("drain");
        }
        assert_eq!(out, src, "{level:?}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: Raw decompressor rejects junk instead of reading out of bounds
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_decompress_rejects_junk() {
    let mut out = vec![0u8; 4096];
    // Token promising a match before the start of output.
    assert!(decompress(&[0x10, b'a', 0xFF, 0xFF], &mut out).is_err());
    // Literal run past the end of input.
    assert!(decompress(&[0xF0, 0xFF], &mut out).is_err());
    // Zero offset.
    assert!(decompress(&[0x14, b'a', 0x00, 0x00], &mut out).is_err());
}
