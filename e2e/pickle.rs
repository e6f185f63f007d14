//! E2E Test Suite 05: Pickler
//!
//! The frame-less single-shot helper:
//! - Idempotence for empty, tiny, repetitive and incompressible payloads
//! - `unpickled_size` agreement without decoding
//! - Wire-level layout of the stored and compressed forms

use lz4flow::{pickle, unpickle, unpickled_size, Level, Lz4Error};

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: Idempotence across payload shapes and levels
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_pickle_idempotence() {
    let ramp: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    let cases: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"x".to_vec(),
        b"abc".to_vec(),
        vec![0xAA; 65_536],
        b"lorem ipsum dolor sit amet ".repeat(999),
        ramp,
    ];
    for src in &cases {
        for level in [Level::Fast, Level::Hc6, Level::Max] {
            let pickled = pickle(src, level);
            assert_eq!(
                unpickled_size(&pickled).expect("size"),
                src.len(),
                "{} bytes at {level:?}",
                src.len()
            );
            assert_eq!(&unpickle(&pickled).expect("unpickle"), src);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: Stored form is exactly source plus one header byte
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_stored_form_layout() {
    // High-entropy bytes defeat every level.
    let src: Vec<u8> = (0u32..2048)
        .map(|i| (i.wrapping_mul(0x45D9_F3B5) >> 13) as u8)
        .collect();
    let pickled = pickle(&src, Level::Max);
    assert_eq!(pickled.len(), src.len() + 1);
    assert_eq!(pickled[0], 0, "stored header byte");
    assert_eq!(&pickled[1..], src.as_slice());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: Compressed form declares its diff width in the header
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_compressed_form_layout() {
    let small = pickle(&b"ha".repeat(100), Level::Fast);
    assert_eq!(small[0] >> 6, 1, "1-byte diff");
    let medium = pickle(&vec![0u8; 40_000], Level::Fast);
    assert_eq!(medium[0] >> 6, 2, "2-byte diff");
    let large = pickle(&vec![0u8; 500_000], Level::Fast);
    assert_eq!(large[0] >> 6, 3, "4-byte diff");
    for pickled in [small, medium, large] {
        assert_eq!(pickled[0] & 0b0011_1111, 0, "version bits");
        unpickle(&pickled).expect("unpickle");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: Future versions and truncated headers fail loudly
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_malformed_pickles() {
    assert!(matches!(
        unpickle(&[0x03]),
        Err(Lz4Error::UnsupportedFeature(_))
    ));
    assert!(matches!(unpickle(&[]), Err(Lz4Error::Truncated)));
    assert!(matches!(
        unpickled_size(&[0b1100_0000, 0x01, 0x02]),
        Err(Lz4Error::Truncated)
    ));
    // Compressed payload whose block stream is garbage.
    assert!(unpickle(&[0b0100_0000, 10, 0xF0, 0xFF]).is_err());
}
