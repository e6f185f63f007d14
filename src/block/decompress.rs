//! Block decompressor.
//!
//! Fully bounds-checked: every length and offset read from the compressed
//! bytes is validated before any copy, so corrupted input yields
//! [`Lz4Error::MalformedStream`] rather than an out-of-bounds access.
//!
//! The decoder writes into `out` starting at `out_start`; everything before
//! the cursor (including `out[..out_start]`) is usable match history, and an
//! optional detached `dict` slice extends the window further back. The
//! chained-block engine keeps its history contiguous and passes an empty
//! dict; one-shot callers pass `out_start == 0`.

use crate::block::types::{MINMATCH, ML_MASK, RUN_MASK};
use crate::error::Lz4Error;

/// Decompress one whole block into `dst`. Returns the decoded length.
pub fn decompress(src: &[u8], dst: &mut [u8]) -> Result<usize, Lz4Error> {
    decompress_into(src, dst, 0, &[], None)
}

/// Decompress one block with an explicit window and an optional partial
/// target.
///
/// With `target == Some(n)` decoding stops exactly after producing `n`
/// bytes, mid-sequence if necessary, and reports however many bytes were
/// produced (fewer than `n` when the block is shorter). With `target ==
/// None` the whole block must fit in `out[out_start..]` or the call fails
/// with [`Lz4Error::OutputTooSmall`].
pub fn decompress_into(
    src: &[u8],
    out: &mut [u8],
    out_start: usize,
    dict: &[u8],
    target: Option<usize>,
) -> Result<usize, Lz4Error> {
    let partial = target.is_some();
    let end = match target {
        Some(n) => {
            let end = out_start + n;
            if end > out.len() {
                return Err(Lz4Error::OutputTooSmall);
            }
            end
        }
        None => out.len(),
    };

    let mut ip = 0usize;
    let mut pos = out_start;

    loop {
        let token = *src
            .get(ip)
            .ok_or(Lz4Error::MalformedStream("truncated sequence"))? as usize;
        ip += 1;

        // ── Literals
        let mut lit_len = token >> 4;
        if lit_len == RUN_MASK {
            loop {
                let byte = *src
                    .get(ip)
                    .ok_or(Lz4Error::MalformedStream("truncated literal length"))?
                    as usize;
                ip += 1;
                lit_len += byte;
                if byte != 255 {
                    break;
                }
            }
        }
        if ip + lit_len > src.len() {
            return Err(Lz4Error::MalformedStream("literal run past input end"));
        }
        if pos + lit_len > end {
            if !partial {
                return Err(Lz4Error::OutputTooSmall);
            }
            let n = end - pos;
            out[pos..end].copy_from_slice(&src[ip..ip + n]);
            return Ok(end - out_start);
        }
        out[pos..pos + lit_len].copy_from_slice(&src[ip..ip + lit_len]);
        ip += lit_len;
        pos += lit_len;

        // A block ends with a literal-only sequence.
        if ip == src.len() {
            return Ok(pos - out_start);
        }
        if partial && pos == end {
            return Ok(end - out_start);
        }

        // ── Match
        if ip + 2 > src.len() {
            return Err(Lz4Error::MalformedStream("truncated match offset"));
        }
        let offset = u16::from_le_bytes([src[ip], src[ip + 1]]) as usize;
        ip += 2;
        if offset == 0 {
            return Err(Lz4Error::MalformedStream("zero match offset"));
        }
        if offset > pos + dict.len() {
            return Err(Lz4Error::MalformedStream("match offset outside window"));
        }

        let mut match_len = (token & ML_MASK) + MINMATCH;
        if match_len == ML_MASK + MINMATCH {
            loop {
                let byte = *src
                    .get(ip)
                    .ok_or(Lz4Error::MalformedStream("truncated match length"))?
                    as usize;
                ip += 1;
                match_len += byte;
                if byte != 255 {
                    break;
                }
            }
        }

        let mut n = match_len;
        let clamped = pos + n > end;
        if clamped {
            if !partial {
                return Err(Lz4Error::OutputTooSmall);
            }
            n = end - pos;
        }

        if offset > pos {
            // Head of the match lives in the detached dictionary.
            let dict_part = (offset - pos).min(n);
            let dict_from = dict.len() - (offset - pos);
            out[pos..pos + dict_part].copy_from_slice(&dict[dict_from..dict_from + dict_part]);
            pos += dict_part;
            let rest = n - dict_part;
            if rest > 0 {
                // Match continues at the start of `out`.
                duplicate(out, pos, pos, rest);
                pos += rest;
            }
        } else {
            duplicate(out, pos, offset, n);
            pos += n;
        }

        if clamped {
            return Ok(end - out_start);
        }
    }
}

/// Copy `len` bytes from `out[pos - offset..]` to `out[pos..]`, replicating
/// the period when the regions overlap (`offset < len`).
fn duplicate(out: &mut [u8], pos: usize, offset: usize, len: usize) {
    debug_assert!(offset >= 1 && offset <= pos);
    if offset >= len {
        out.copy_within(pos - offset..pos - offset + len, pos);
        return;
    }
    // Materialize one period, then grow by doubling; sources always lie
    // before the destination.
    out.copy_within(pos - offset..pos, pos);
    let mut filled = offset;
    while filled < len {
        let n = filled.min(len - filled);
        out.copy_within(pos..pos + n, pos + filled);
        filled += n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::compress::compress;
    use crate::block::types::compress_bound;

    fn pack(data: &[u8]) -> Vec<u8> {
        let mut dst = vec![0u8; compress_bound(data.len())];
        let n = compress(data, &mut dst, 1).unwrap();
        dst.truncate(n);
        dst
    }

    #[test]
    fn literal_only_block() {
        // token 0x30, "abc"
        let src = [0x30, b'a', b'b', b'c'];
        let mut out = [0u8; 8];
        assert_eq!(decompress(&src, &mut out).unwrap(), 3);
        assert_eq!(&out[..3], b"abc");
    }

    #[test]
    fn rle_via_offset_one() {
        // 1 literal 'z', then a 20-byte match at offset 1, then 5 literals.
        let src = [0x1F, b'z', 0x01, 0x00, 0x01, 0x50, b'a', b'b', b'c', b'd', b'e'];
        let mut out = [0u8; 32];
        let n = decompress(&src, &mut out).unwrap();
        assert_eq!(n, 26);
        assert!(out[..21].iter().all(|&b| b == b'z'));
        assert_eq!(&out[21..26], b"abcde");
    }

    #[test]
    fn short_period_replication() {
        let mut data = b"abc".repeat(50);
        data.extend_from_slice(b"trailing");
        let packed = pack(&data);
        let mut out = vec![0u8; data.len()];
        assert_eq!(decompress(&packed, &mut out).unwrap(), data.len());
        assert_eq!(out, data);
    }

    #[test]
    fn partial_decode_stops_exactly() {
        let data = b"0123456789".repeat(100);
        let packed = pack(&data);
        let mut out = vec![0u8; data.len()];
        for want in [0usize, 1, 7, 250, 999] {
            let n = decompress_into(&packed, &mut out, 0, &[], Some(want)).unwrap();
            assert_eq!(n, want);
            assert_eq!(&out[..n], &data[..n]);
        }
    }

    #[test]
    fn partial_target_beyond_block_returns_block_len() {
        let data = b"hello world hello world hello";
        let packed = pack(data);
        let mut out = vec![0u8; 4096];
        let n = decompress_into(&packed, &mut out, 0, &[], Some(4096)).unwrap();
        assert_eq!(n, data.len());
    }

    #[test]
    fn detached_dictionary_window() {
        // Compress two copies as one buffer, then decode the second block
        // with the first supplied as a detached dict.
        let chunk: Vec<u8> = b"dictionary window material ".repeat(30);
        let mut joined = chunk.clone();
        let start = joined.len();
        joined.extend_from_slice(&chunk);

        let mut table = crate::block::compress::FastTable::wide();
        let mut scratch = vec![0u8; compress_bound(start)];
        crate::block::compress::compress_with_table(&joined, 0, start, &mut scratch, &mut table, 1)
            .unwrap();
        let mut packed = vec![0u8; compress_bound(chunk.len())];
        let n = crate::block::compress::compress_with_table(
            &joined,
            start,
            joined.len(),
            &mut packed,
            &mut table,
            1,
        )
        .unwrap();

        let mut out = vec![0u8; chunk.len()];
        let m = decompress_into(&packed[..n], &mut out, 0, &chunk, None).unwrap();
        assert_eq!(m, chunk.len());
        assert_eq!(out, chunk);
    }

    #[test]
    fn zero_offset_is_malformed() {
        let src = [0x14, b'x', 0x00, 0x00];
        let mut out = [0u8; 16];
        assert!(matches!(
            decompress(&src, &mut out),
            Err(Lz4Error::MalformedStream(_))
        ));
    }

    #[test]
    fn offset_outside_window_is_malformed() {
        // 1 literal, then offset 9000 with nothing behind it.
        let src = [0x14, b'x', 0x28, 0x23];
        let mut out = [0u8; 64];
        assert!(matches!(
            decompress(&src, &mut out),
            Err(Lz4Error::MalformedStream(_))
        ));
    }

    #[test]
    fn truncated_input_is_malformed() {
        let data = b"some compressible data some compressible data";
        let packed = pack(data);
        let mut out = vec![0u8; data.len()];
        for cut in [packed.len() - 1, packed.len() / 2, 1] {
            let r = decompress(&packed[..cut], &mut out);
            assert!(
                matches!(r, Err(Lz4Error::MalformedStream(_)) | Ok(_)),
                "cut at {cut} must not panic"
            );
        }
    }

    #[test]
    fn small_output_is_recoverable() {
        let data = b"abcdefgh".repeat(64);
        let packed = pack(&data);
        let mut out = vec![0u8; 10];
        assert!(matches!(
            decompress(&packed, &mut out),
            Err(Lz4Error::OutputTooSmall)
        ));
    }
}
