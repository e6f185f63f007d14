//! One-shot helpers for in-memory payloads.
//!
//! Convenience wrappers over the frame sessions for the common case of a
//! byte slice in, `Vec<u8>` out. The compress helpers record the content
//! length in the header so [`frame_decompress`] can size its output in one
//! allocation.

use crate::error::Lz4Error;
use crate::frame::descriptor::{BlockSize, Descriptor};
use crate::io::stream::{FrameReadSession, FrameWriteSession};
use crate::level::Level;

/// Compress `src` into a single frame with default settings: chained
/// blocks, block size fitted to the payload, content length recorded.
pub fn frame_compress(src: &[u8], level: Level) -> Result<Vec<u8>, Lz4Error> {
    let descriptor = Descriptor {
        content_length: Some(src.len() as u64),
        block_size: BlockSize::fitting(src.len() as u64),
        ..Descriptor::default()
    };
    frame_compress_with(src, descriptor, level)
}

/// Compress `src` into a single frame under an explicit descriptor.
pub fn frame_compress_with(
    src: &[u8],
    descriptor: Descriptor,
    level: Level,
) -> Result<Vec<u8>, Lz4Error> {
    let mut session = FrameWriteSession::new(Vec::new(), descriptor, level)?;
    session.write(src)?;
    session.into_inner()
}

/// Decompress one or more concatenated frames from `src`.
pub fn frame_decompress(src: &[u8]) -> Result<Vec<u8>, Lz4Error> {
    let mut session = FrameReadSession::new(src);
    // The declared length is an untrusted hint; cap the preallocation at
    // the most the input could possibly expand to and let the vector grow
    // from there if a later frame adds more.
    let ceiling = (src.len() as u64)
        .saturating_mul(255)
        .saturating_add(64)
        .min(usize::MAX as u64);
    let mut out = match session.frame_length()? {
        Some(length) => Vec::with_capacity(length.min(ceiling) as usize),
        None => Vec::new(),
    };
    let mut chunk = [0u8; 16 * 1024];
    loop {
        let n = session.read_some(&mut chunk)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&chunk[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_roundtrips() {
        let wire = frame_compress(b"", Level::Fast).unwrap();
        assert_eq!(frame_decompress(&wire).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn default_descriptor_records_length() {
        let payload = vec![42u8; 300_000];
        let wire = frame_compress(&payload, Level::Fast).unwrap();
        let mut session = FrameReadSession::new(wire.as_slice());
        assert_eq!(session.frame_length().unwrap(), Some(300_000));
        assert_eq!(
            session.descriptor().map(|d| d.block_size),
            Some(BlockSize::Max256Kb)
        );
        assert_eq!(frame_decompress(&wire).unwrap(), payload);
    }

    #[test]
    fn every_level_roundtrips() {
        let payload: Vec<u8> = (0..120_000u32).map(|i| (i.wrapping_mul(i) >> 7) as u8).collect();
        for level in [Level::Fast, Level::Hc3, Level::Hc9, Level::Opt10, Level::Max] {
            let wire = frame_compress(&payload, level).unwrap();
            assert_eq!(frame_decompress(&wire).unwrap(), payload, "{level:?}");
        }
    }

    #[test]
    fn huge_declared_length_errors_without_allocating() {
        use crate::frame::descriptor::{header_checksum, MAGIC};

        // A 12-byte header claiming u64::MAX plain bytes must come back as
        // an error, not a capacity panic or a giant allocation.
        let mut wire = Vec::new();
        wire.extend_from_slice(&MAGIC.to_le_bytes());
        let mut desc = vec![0b0100_1000u8, 0x40];
        desc.extend_from_slice(&u64::MAX.to_le_bytes());
        wire.extend_from_slice(&desc);
        wire.push(header_checksum(&desc));
        wire.extend_from_slice(&0u32.to_le_bytes());

        assert!(matches!(
            frame_decompress(&wire).unwrap_err(),
            Lz4Error::MalformedStream(_)
        ));
    }

    #[test]
    fn concatenated_frames_decode_as_one() {
        let mut wire = frame_compress(b"one,", Level::Fast).unwrap();
        wire.extend_from_slice(&frame_compress(b"two", Level::Max).unwrap());
        assert_eq!(frame_decompress(&wire).unwrap(), b"one,two");
    }
}
