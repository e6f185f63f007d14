//! Single-shot self-contained compression, no frame.
//!
//! A pickle is a 1-byte header, an optional size-diff field, and either a
//! raw copy or a bare LZ4 block. The header byte is
//! `(llen_code << 6) | version` where version is 0 and `llen_code` picks
//! the diff width: 0 means stored (no diff field), 1/2/3 mean a 1/2/4-byte
//! little-endian `source_length - payload_length`. Payloads that fail to
//! shrink are stored verbatim, so a pickle is never more than one byte
//! longer than its source.

use crate::block;
use crate::codec::encode_block;
use crate::error::Lz4Error;
use crate::level::Level;

const VERSION_MASK: u8 = 0b0000_0111;
const CURRENT_VERSION: u8 = 0;

fn diff_width(llen_code: u8) -> usize {
    match llen_code {
        0 => 0,
        1 => 1,
        2 => 2,
        _ => 4,
    }
}

fn stored(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + src.len());
    out.push(CURRENT_VERSION);
    out.extend_from_slice(src);
    out
}

/// Compress `src` into a self-describing buffer.
pub fn pickle(src: &[u8], level: Level) -> Vec<u8> {
    if src.is_empty() {
        return stored(src);
    }
    // Worth encoding only if it comes out strictly smaller.
    let mut scratch = vec![0u8; src.len() - 1];
    let encoded = match encode_block(src, &mut scratch, level) {
        Ok(n) => n,
        Err(_) => return stored(src),
    };
    let diff = src.len() - encoded;
    let (llen_code, width): (u8, usize) = if diff < 0x100 {
        (1, 1)
    } else if diff < 0x1_0000 {
        (2, 2)
    } else {
        (3, 4)
    };
    let mut out = Vec::with_capacity(1 + width + encoded);
    out.push((llen_code << 6) | CURRENT_VERSION);
    out.extend_from_slice(&(diff as u32).to_le_bytes()[..width]);
    out.extend_from_slice(&scratch[..encoded]);
    out
}

fn parse(src: &[u8]) -> Result<(usize, &[u8]), Lz4Error> {
    let flags = *src.first().ok_or(Lz4Error::Truncated)?;
    if flags & VERSION_MASK != CURRENT_VERSION {
        return Err(Lz4Error::UnsupportedFeature("pickle version"));
    }
    let llen_code = flags >> 6;
    let width = diff_width(llen_code);
    if src.len() < 1 + width {
        return Err(Lz4Error::Truncated);
    }
    let mut diff_bytes = [0u8; 4];
    diff_bytes[..width].copy_from_slice(&src[1..1 + width]);
    let diff = u32::from_le_bytes(diff_bytes) as usize;
    let payload = &src[1 + width..];
    Ok((payload.len() + diff, payload))
}

/// Decoded size of a pickle without decoding it.
pub fn unpickled_size(src: &[u8]) -> Result<usize, Lz4Error> {
    parse(src).map(|(size, _)| size)
}

/// Reverse of [`pickle`].
pub fn unpickle(src: &[u8]) -> Result<Vec<u8>, Lz4Error> {
    let (target, payload) = parse(src)?;
    if target == payload.len() {
        return Ok(payload.to_vec());
    }
    let mut out = vec![0u8; target];
    let written = block::decompress(payload, &mut out)?;
    if written != target {
        return Err(Lz4Error::MalformedStream("pickle size mismatch"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_a_single_byte() {
        let pickled = pickle(b"", Level::Fast);
        assert_eq!(pickled, vec![0u8]);
        assert_eq!(unpickled_size(&pickled).unwrap(), 0);
        assert_eq!(unpickle(&pickled).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn incompressible_input_is_stored() {
        let src: Vec<u8> = (0..=255u8).collect();
        let pickled = pickle(&src, Level::Max);
        assert_eq!(pickled.len(), src.len() + 1);
        assert_eq!(pickled[0], 0);
        assert_eq!(unpickle(&pickled).unwrap(), src);
    }

    #[test]
    fn repetitive_input_shrinks() {
        let src = b"a small phrase, ".repeat(4096);
        for level in [Level::Fast, Level::Hc6, Level::Max] {
            let pickled = pickle(&src, level);
            assert!(pickled.len() < src.len() / 8);
            assert_eq!(unpickled_size(&pickled).unwrap(), src.len());
            assert_eq!(unpickle(&pickled).unwrap(), src);
        }
    }

    #[test]
    fn diff_width_scales_with_savings() {
        // ~100 KiB of zeros: diff needs more than two bytes.
        let src = vec![0u8; 100_000];
        let pickled = pickle(&src, Level::Fast);
        assert_eq!(pickled[0] >> 6, 3);
        assert_eq!(unpickle(&pickled).unwrap(), src);
    }

    #[test]
    fn unknown_version_is_rejected() {
        assert!(matches!(
            unpickle(&[0b0000_0001, 0x00]),
            Err(Lz4Error::UnsupportedFeature(_))
        ));
    }

    #[test]
    fn truncated_pickle_is_rejected() {
        assert!(matches!(unpickle(&[]), Err(Lz4Error::Truncated)));
        assert!(matches!(unpickle(&[0b1100_0000, 1, 2]), Err(Lz4Error::Truncated)));
    }

    #[test]
    fn single_byte_roundtrips() {
        let pickled = pickle(b"x", Level::Fast);
        assert_eq!(unpickle(&pickled).unwrap(), b"x");
    }
}
