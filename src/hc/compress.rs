//! Hash-chain compressor (levels 3..=9) and the sequence emitter it shares
//! with the optimal parser.
//!
//! Greedy with one position of lookahead: after finding a match the engine
//! probes the next position for a strictly longer one, trading the skipped
//! byte as a literal. The per-level candidate budget is the only knob.

use crate::block::types::{
    count_back, LASTLITERALS, MFLIMIT, MINMATCH, MIN_LENGTH, ML_BITS, ML_MASK, RUN_MASK,
};
use crate::error::Lz4Error;
use crate::hc::search::ChainIndex;
use crate::hc::types::Match;

/// Append one sequence: literals `buf[lit_from..lit_to]`, then a match of
/// `match_len` bytes at `offset` behind `lit_to`.
pub(crate) fn emit_sequence(
    buf: &[u8],
    lit_from: usize,
    lit_to: usize,
    offset: usize,
    match_len: usize,
    dst: &mut [u8],
    op: &mut usize,
) -> Result<(), Lz4Error> {
    debug_assert!(offset >= 1 && offset <= crate::block::types::DISTANCE_MAX);
    debug_assert!(match_len >= MINMATCH);
    let lit_len = lit_to - lit_from;
    if *op + lit_len + lit_len / 255 + 2 + 1 + LASTLITERALS > dst.len() {
        return Err(Lz4Error::OutputTooSmall);
    }

    let token_pos = *op;
    *op += 1;
    if lit_len >= RUN_MASK {
        dst[token_pos] = (RUN_MASK as u8) << ML_BITS;
        let mut rest = lit_len - RUN_MASK;
        while rest >= 255 {
            dst[*op] = 255;
            *op += 1;
            rest -= 255;
        }
        dst[*op] = rest as u8;
        *op += 1;
    } else {
        dst[token_pos] = (lit_len as u8) << ML_BITS;
    }
    dst[*op..*op + lit_len].copy_from_slice(&buf[lit_from..lit_to]);
    *op += lit_len;

    dst[*op..*op + 2].copy_from_slice(&(offset as u16).to_le_bytes());
    *op += 2;

    let ml_ext = match_len - MINMATCH;
    if ml_ext >= ML_MASK {
        if *op + 1 + (ml_ext - ML_MASK) / 255 + LASTLITERALS > dst.len() {
            return Err(Lz4Error::OutputTooSmall);
        }
        dst[token_pos] |= ML_MASK as u8;
        let mut rest = ml_ext - ML_MASK;
        while rest >= 255 {
            dst[*op] = 255;
            *op += 1;
            rest -= 255;
        }
        dst[*op] = rest as u8;
        *op += 1;
    } else {
        dst[token_pos] |= ml_ext as u8;
    }
    Ok(())
}

/// Append the closing literal-only run `buf[from..to]`.
pub(crate) fn emit_last_literals(
    buf: &[u8],
    from: usize,
    to: usize,
    dst: &mut [u8],
    op: &mut usize,
) -> Result<(), Lz4Error> {
    let run = to - from;
    let ext = if run >= RUN_MASK {
        1 + (run - RUN_MASK) / 255
    } else {
        0
    };
    if *op + 1 + ext + run > dst.len() {
        return Err(Lz4Error::OutputTooSmall);
    }
    if run >= RUN_MASK {
        dst[*op] = (RUN_MASK as u8) << ML_BITS;
        *op += 1;
        let mut rest = run - RUN_MASK;
        while rest >= 255 {
            dst[*op] = 255;
            *op += 1;
            rest -= 255;
        }
        dst[*op] = rest as u8;
        *op += 1;
    } else {
        dst[*op] = (run as u8) << ML_BITS;
        *op += 1;
    }
    dst[*op..*op + run].copy_from_slice(&buf[from..to]);
    *op += run;
    Ok(())
}

/// Compress `buf[src_start..src_end]` against `buf[..src_start]` history
/// with the hash-chain engine. Returns bytes written to `dst`.
pub fn compress_hash_chain(
    buf: &[u8],
    src_start: usize,
    src_end: usize,
    dst: &mut [u8],
    index: &mut ChainIndex,
    nb_searches: u32,
) -> Result<usize, Lz4Error> {
    let src_len = src_end - src_start;
    let mut op = 0usize;

    if src_len == 0 {
        if dst.is_empty() {
            return Err(Lz4Error::OutputTooSmall);
        }
        dst[0] = 0;
        return Ok(1);
    }

    let mut anchor = src_start;

    if src_len >= MIN_LENGTH {
        let mf_limit = src_end - MFLIMIT;
        let match_limit = src_end - LASTLITERALS;
        let mut ip = src_start;

        while ip <= mf_limit {
            let Some(found) = index.search(buf, ip, MINMATCH, match_limit, nb_searches) else {
                ip += 1;
                continue;
            };
            let Match {
                mut pos,
                mut len,
            } = found;

            // Lookahead: take a strictly longer match one position later
            // rather than committing a short one that blocks it.
            while ip < mf_limit {
                match index.search(buf, ip + 1, len + 1, match_limit, nb_searches) {
                    Some(wider) => {
                        ip += 1;
                        pos = wider.pos;
                        len = wider.len;
                    }
                    None => break,
                }
            }

            // Extend backwards into pending literals.
            let back = count_back(buf, ip, pos, anchor, 0);
            ip -= back;
            pos -= back;
            len += back;

            emit_sequence(buf, anchor, ip, ip - pos, len, dst, &mut op)?;
            ip += len;
            anchor = ip;
        }
    }

    emit_last_literals(buf, anchor, src_end, dst, &mut op)?;
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::compress_bound;
    use crate::block::decompress::decompress;

    fn hc_roundtrip(data: &[u8], nb_searches: u32) -> usize {
        let mut dst = vec![0u8; compress_bound(data.len())];
        let mut index = ChainIndex::new();
        let n =
            compress_hash_chain(data, 0, data.len(), &mut dst, &mut index, nb_searches).unwrap();
        let mut out = vec![0u8; data.len()];
        assert_eq!(decompress(&dst[..n], &mut out).unwrap(), data.len());
        assert_eq!(out, data);
        n
    }

    #[test]
    fn empty_and_tiny_inputs() {
        let mut dst = [0u8; 16];
        let mut index = ChainIndex::new();
        assert_eq!(
            compress_hash_chain(b"", 0, 0, &mut dst, &mut index, 16).unwrap(),
            1
        );
        index.reset();
        let n = compress_hash_chain(b"abc", 0, 3, &mut dst, &mut index, 16).unwrap();
        assert_eq!(&dst[..n], &[0x30, b'a', b'b', b'c']);
    }

    #[test]
    fn beats_or_matches_plain_literals() {
        let data = b"structured structured structured data data data ".repeat(64);
        let n = hc_roundtrip(&data, 64);
        assert!(n < data.len() / 4);
    }

    #[test]
    fn bigger_budget_never_hurts_much() {
        let mut data = Vec::new();
        for i in 0u32..3000 {
            data.extend_from_slice(format!("row-{:04}|", i % 97).as_bytes());
        }
        let cheap = hc_roundtrip(&data, 4);
        let rich = hc_roundtrip(&data, 256);
        // Not strictly monotonic in theory; allow a sliver of slack.
        assert!(rich <= cheap + cheap / 20);
    }

    #[test]
    fn random_data_roundtrips() {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let data: Vec<u8> = (0..20_000)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                (state >> 33) as u8
            })
            .collect();
        hc_roundtrip(&data, 64);
    }
}
