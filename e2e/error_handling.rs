//! E2E Test Suite 04: Error Handling
//!
//! The failure surface of the frame layer:
//! - Bad magic and reserved version bits
//! - Header checksum sensitivity (every descriptor bit)
//! - Block and content checksum validation on declared streams
//! - Truncation mid-structure vs clean end of stream
//! - Unsupported features (dictionary ID, write-side checksums)
//! - Session poisoning after a fatal error

use lz4flow::frame::descriptor::{header_checksum, Descriptor, MAGIC};
use lz4flow::io::{frame_compress, frame_decompress, FrameReadSession, FrameWriteSession};
use lz4flow::xxhash::xxh32_oneshot;
use lz4flow::{ChecksumKind, Level, Lz4Error};

/// Hand-assembled frame with checksums, since the writer refuses to
/// produce them.
fn checksummed_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&MAGIC.to_le_bytes());
    // version 01, block checksum, content checksum; 64 KiB blocks
    let desc = [0b0101_0100u8, 0x40];
    frame.extend_from_slice(&desc);
    frame.push(header_checksum(&desc));
    frame.extend_from_slice(&(payload.len() as u32 | 0x8000_0000).to_le_bytes());
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&xxh32_oneshot(payload, 0).to_le_bytes());
    frame.extend_from_slice(&0u32.to_le_bytes());
    frame.extend_from_slice(&xxh32_oneshot(payload, 0).to_le_bytes());
    frame
}

fn decode(frame: &[u8]) -> Result<Vec<u8>, Lz4Error> {
    frame_decompress(frame)
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: Wrong magic number
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_bad_magic() {
    assert!(matches!(
        decode(b"\x00\x22\x4d\x18 oops").unwrap_err(),
        Lz4Error::MagicExpected
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: Reserved frame version bits
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_version() {
    let mut frame = Vec::new();
    frame.extend_from_slice(&MAGIC.to_le_bytes());
    let desc = [0b1000_0000u8, 0x40]; // version bits = 10
    frame.extend_from_slice(&desc);
    frame.push(header_checksum(&desc));
    assert!(matches!(
        decode(&frame).unwrap_err(),
        Lz4Error::UnknownFrameVersion(2)
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: Flipping any descriptor bit trips the header checksum
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_header_checksum_sensitivity() {
    let wire = frame_compress(b"sensitive header", Level::Fast).unwrap();
    // Bytes 4 and 5 are FLG and BD.
    for byte in 4..6 {
        for bit in 0..8 {
            let mut corrupt = wire.clone();
            corrupt[byte] ^= 1 << bit;
            let err = decode(&corrupt).unwrap_err();
            assert!(
                matches!(
                    err,
                    Lz4Error::InvalidChecksum(ChecksumKind::Header)
                        | Lz4Error::UnknownFrameVersion(_)
                ),
                "byte {byte} bit {bit}: {err:?}"
            );
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: Declared block and content checksums are validated
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_declared_checksums_validated() {
    let frame = checksummed_frame(b"stored with checksums");
    assert_eq!(decode(&frame).unwrap(), b"stored with checksums");

    // Corrupt the payload: block checksum trips first.
    let mut corrupt = frame.clone();
    corrupt[11] ^= 0x01;
    assert!(matches!(
        decode(&corrupt).unwrap_err(),
        Lz4Error::InvalidChecksum(ChecksumKind::Block)
    ));

    // Corrupt only the trailing content checksum.
    let mut corrupt = frame.clone();
    let last = corrupt.len() - 1;
    corrupt[last] ^= 0x01;
    assert!(matches!(
        decode(&corrupt).unwrap_err(),
        Lz4Error::InvalidChecksum(ChecksumKind::Content)
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: Truncation mid-structure is an error; clean EOF is not
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_truncation_vs_clean_eof() {
    let wire = frame_compress(&b"truncate me ".repeat(600), Level::Fast).unwrap();
    for cut in [2, 5, 9, wire.len() / 2, wire.len() - 1] {
        assert!(
            matches!(decode(&wire[..cut]).unwrap_err(), Lz4Error::Truncated),
            "cut at {cut}"
        );
    }
    // Empty stream: no frames, no error.
    assert_eq!(decode(b"").unwrap(), Vec::<u8>::new());
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: Dictionary IDs are an explicit unsupported feature
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_dictionary_id_rejected() {
    let mut frame = Vec::new();
    frame.extend_from_slice(&MAGIC.to_le_bytes());
    let desc = [0b0100_0001u8, 0x40, 0x01, 0x02, 0x03, 0x04];
    frame.extend_from_slice(&desc);
    frame.push(header_checksum(&desc));
    assert!(matches!(
        decode(&frame).unwrap_err(),
        Lz4Error::UnsupportedFeature(_)
    ));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 7: Writer refuses descriptors it cannot honor
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_writer_rejects_unsupported_descriptors() {
    for descriptor in [
        Descriptor {
            block_checksum: true,
            ..Descriptor::default()
        },
        Descriptor {
            content_checksum: true,
            ..Descriptor::default()
        },
        Descriptor {
            dictionary_id: Some(0xDEAD_BEEF),
            ..Descriptor::default()
        },
    ] {
        assert!(matches!(
            FrameWriteSession::new(Vec::new(), descriptor, Level::Fast),
            Err(Lz4Error::UnsupportedFeature(_))
        ));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 8: A fatal error poisons the session
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_fatal_error_poisons_session() {
    let mut wire = frame_compress(b"poison", Level::Fast).unwrap();
    wire[6] ^= 0xFF; // header checksum byte
    let mut session = FrameReadSession::new(wire.as_slice());
    let mut out = [0u8; 16];
    assert!(session.read(&mut out).is_err());
    assert!(matches!(session.read(&mut out), Err(Lz4Error::Closed)));
    assert!(matches!(session.open(), Err(Lz4Error::Closed)));
}
