//! E2E Test Suite 01: Frame Round-Trips
//!
//! One-shot frame compression/decompression over in-memory buffers:
//! - Round-trips across every compression level and block size
//! - Degenerate payloads (empty, single byte, long runs, incompressible)
//! - Chained vs independent blocks decode to identical content
//! - Declared content length

use lz4flow::frame::descriptor::{BlockSize, Descriptor};
use lz4flow::io::{frame_compress, frame_compress_with, frame_decompress};
use lz4flow::io::FrameReadSession;
use lz4flow::Level;

const LEVELS: [Level; 6] = [
    Level::Fast,
    Level::Hc3,
    Level::Hc6,
    Level::Hc9,
    Level::Opt10,
    Level::Max,
];

fn natural_text(bytes: usize) -> Vec<u8> {
    b"It is a truth universally acknowledged, that a single man in \
      possession of a good fortune, must be in want of a wife. "
        .iter()
        .copied()
        .cycle()
        .take(bytes)
        .collect()
}

fn pseudo_random(bytes: usize) -> Vec<u8> {
    let mut state = 0x9E37_79B9u32;
    (0..bytes)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: The 44-byte fox sentence survives a fast round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fox_sentence_roundtrip() {
    let src = b"The quick brown fox jumps over the lazy dog.";
    assert_eq!(src.len(), 44);
    let wire = frame_compress(src, Level::Fast).expect("compress");
    assert_eq!(frame_decompress(&wire).expect("decompress"), src);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: 64 KiB of 0xAA compresses below 1 KiB and restores fully
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_repeated_byte_compresses_hard() {
    let src = vec![0xAAu8; 65_536];
    let descriptor = Descriptor {
        block_size: BlockSize::Max64Kb,
        chaining: true,
        ..Descriptor::default()
    };
    let wire = frame_compress_with(&src, descriptor, Level::Fast).expect("compress");
    assert!(wire.len() < 1024, "compressed to {} bytes", wire.len());
    assert_eq!(frame_decompress(&wire).expect("decompress"), src);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: Every level and block size round-trips natural text
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_all_levels_and_block_sizes() {
    let src = natural_text(700_000);
    for level in LEVELS {
        for block_size in [
            BlockSize::Max64Kb,
            BlockSize::Max256Kb,
            BlockSize::Max1Mb,
            BlockSize::Max4Mb,
        ] {
            let descriptor = Descriptor {
                block_size,
                ..Descriptor::default()
            };
            let wire = frame_compress_with(&src, descriptor, level).expect("compress");
            assert_eq!(
                frame_decompress(&wire).expect("decompress"),
                src,
                "level {level:?}, block size {block_size:?}"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: Degenerate payloads
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_degenerate_payloads() {
    let cases: Vec<Vec<u8>> = vec![
        Vec::new(),
        vec![b'z'],
        vec![0u8; 13],
        vec![7u8; 1_000_000],
        pseudo_random(262_144),
    ];
    for src in &cases {
        for level in [Level::Fast, Level::Hc9, Level::Max] {
            let wire = frame_compress(src, level).expect("compress");
            assert_eq!(
                &frame_decompress(&wire).expect("decompress"),
                src,
                "{} bytes at {level:?}",
                src.len()
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: Chaining changes the bytes, never the content
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_chaining_invariance() {
    // Long-range repetition so chaining actually finds cross-block matches.
    let src = natural_text(500_000);
    let chained = Descriptor {
        chaining: true,
        block_size: BlockSize::Max64Kb,
        ..Descriptor::default()
    };
    let independent = Descriptor {
        chaining: false,
        block_size: BlockSize::Max64Kb,
        ..Descriptor::default()
    };
    let wire_chained = frame_compress_with(&src, chained, Level::Fast).expect("compress");
    let wire_independent = frame_compress_with(&src, independent, Level::Fast).expect("compress");
    assert_ne!(wire_chained, wire_independent);
    assert!(
        wire_chained.len() < wire_independent.len(),
        "chained {} vs independent {}",
        wire_chained.len(),
        wire_independent.len()
    );
    assert_eq!(frame_decompress(&wire_chained).expect("decompress"), src);
    assert_eq!(frame_decompress(&wire_independent).expect("decompress"), src);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: Content length is declared and readable before draining
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_declared_content_length() {
    let src = natural_text(123_457);
    let wire = frame_compress(&src, Level::Fast).expect("compress");
    let mut session = FrameReadSession::new(wire.as_slice());
    assert_eq!(session.frame_length().expect("open"), Some(123_457));
    let descriptor = session.descriptor().expect("descriptor").clone();
    assert!(descriptor.chaining);
    assert_eq!(descriptor.block_size, BlockSize::Max256Kb);
}
