//! Fast greedy block compressor.
//!
//! Single-pass: hash the 4-or-5-byte sequence at the cursor, probe one table
//! candidate, extend any hit forwards (and backwards into the pending
//! literals), emit the sequence, repeat. On incompressible data the probe
//! stride grows geometrically so throughput degrades gracefully.
//!
//! The compressor works over one contiguous buffer: `buf[..src_start]` is
//! usable match history (the chained-block prefix), `buf[src_start..src_end]`
//! is the data to compress. One-shot callers pass `src_start == 0`.

use crate::block::types::{
    compress_bound, count_common, hash4, hash5, read_u32, read_u64, DISTANCE_MAX, LASTLITERALS,
    LIMIT_64K, MFLIMIT, MINMATCH, MIN_LENGTH, ML_BITS, ML_MASK, RUN_MASK, SKIP_TRIGGER,
};
use crate::error::Lz4Error;

const NARROW_HASH_LOG: u32 = 13;
const WIDE_HASH_LOG: u32 = 12;
const EMPTY: u32 = u32::MAX;

/// Match-candidate index for the fast compressor.
///
/// `Narrow` stores 16-bit positions relative to the buffer start and fits
/// one-shot inputs below [`LIMIT_64K`]. `Wide` stores absolute 32-bit
/// positions with an explicit empty sentinel and supports chained blocks;
/// [`FastTable::rebase`] keeps it valid across window compaction.
pub enum FastTable {
    Narrow(Box<[u16]>),
    Wide(Box<[u32]>),
}

impl FastTable {
    pub fn narrow() -> FastTable {
        FastTable::Narrow(vec![0u16; 1 << NARROW_HASH_LOG].into_boxed_slice())
    }

    pub fn wide() -> FastTable {
        FastTable::Wide(vec![EMPTY; 1 << WIDE_HASH_LOG].into_boxed_slice())
    }

    #[inline]
    fn hash_at(&self, buf: &[u8], pos: usize) -> usize {
        match self {
            FastTable::Narrow(_) => hash4(read_u32(buf, pos), NARROW_HASH_LOG),
            FastTable::Wide(_) => hash5(read_u64(buf, pos), WIDE_HASH_LOG),
        }
    }

    #[inline]
    fn put(&mut self, slot: usize, pos: usize) {
        match self {
            FastTable::Narrow(t) => t[slot] = pos as u16,
            FastTable::Wide(t) => t[slot] = pos as u32,
        }
    }

    /// Candidate position for `slot`, screened against the cursor: in range,
    /// strictly older, no further back than [`DISTANCE_MAX`].
    #[inline]
    fn candidate(&self, slot: usize, cursor: usize) -> Option<usize> {
        match self {
            // A zeroed slot aliases position 0; the caller's 4-byte compare
            // rejects it unless it really matches.
            FastTable::Narrow(t) => Some(t[slot] as usize).filter(|&p| p < cursor),
            FastTable::Wide(t) => {
                let entry = t[slot];
                if entry == EMPTY {
                    return None;
                }
                let pos = entry as usize;
                (pos < cursor && cursor - pos <= DISTANCE_MAX).then_some(pos)
            }
        }
    }

    /// Shift all positions down by `delta` after window compaction, dropping
    /// entries that fall off the front.
    pub fn rebase(&mut self, delta: usize) {
        match self {
            FastTable::Narrow(t) => t.fill(0),
            FastTable::Wide(t) => {
                let delta = delta as u32;
                for entry in t.iter_mut() {
                    *entry = match *entry {
                        EMPTY => EMPTY,
                        pos if pos < delta => EMPTY,
                        pos => pos - delta,
                    };
                }
            }
        }
    }

    pub fn clear(&mut self) {
        match self {
            FastTable::Narrow(t) => t.fill(0),
            FastTable::Wide(t) => t.fill(EMPTY),
        }
    }
}

/// Compress one block with an acceleration factor (1 = nominal).
/// Returns the number of bytes written to `dst`.
pub fn compress(src: &[u8], dst: &mut [u8], acceleration: usize) -> Result<usize, Lz4Error> {
    let mut table = if src.len() < LIMIT_64K {
        FastTable::narrow()
    } else {
        FastTable::wide()
    };
    compress_with_table(src, 0, src.len(), dst, &mut table, acceleration.max(1))
}

/// Compress `buf[src_start..src_end]` against the history in
/// `buf[..src_start]`, reusing (and updating) the caller's table.
pub fn compress_with_table(
    buf: &[u8],
    src_start: usize,
    src_end: usize,
    dst: &mut [u8],
    table: &mut FastTable,
    acceleration: usize,
) -> Result<usize, Lz4Error> {
    debug_assert!(src_start <= src_end && src_end <= buf.len());
    let src_len = src_end - src_start;
    let mut op = 0usize;

    if src_len == 0 {
        if dst.is_empty() {
            return Err(Lz4Error::OutputTooSmall);
        }
        dst[0] = 0; // empty literal run
        return Ok(1);
    }

    let mut anchor = src_start;

    if src_len >= MIN_LENGTH {
        let mf_limit = src_end - MFLIMIT;
        let match_limit = src_end - LASTLITERALS;
        let mut ip = src_start;
        let slot = table.hash_at(buf, ip);
        table.put(slot, ip);
        ip += 1;

        'outer: loop {
            // ── Search: probe with a widening stride until a candidate's
            // 4 leading bytes match.
            let mut mpos;
            {
                let mut probe = ip;
                let mut step = 1usize;
                let mut search_acc = acceleration << SKIP_TRIGGER;
                loop {
                    ip = probe;
                    probe += step;
                    step = search_acc >> SKIP_TRIGGER;
                    search_acc += 1;
                    if ip > mf_limit {
                        break 'outer;
                    }
                    let slot = table.hash_at(buf, ip);
                    let cand = table.candidate(slot, ip);
                    table.put(slot, ip);
                    if let Some(m) = cand {
                        if read_u32(buf, m) == read_u32(buf, ip) {
                            mpos = m;
                            break;
                        }
                    }
                }
            }

            // Catch up: extend the match backwards into pending literals.
            while ip > anchor && mpos > 0 && buf[ip - 1] == buf[mpos - 1] {
                ip -= 1;
                mpos -= 1;
            }

            // ── Emit sequences; stays in this loop while matches chain
            // back-to-back with no literals between them.
            loop {
                let lit_len = ip - anchor;
                if op + lit_len + lit_len / 255 + 2 + 1 + LASTLITERALS > dst.len() {
                    return Err(Lz4Error::OutputTooSmall);
                }
                let token_pos = op;
                op += 1;
                if lit_len >= RUN_MASK {
                    dst[token_pos] = (RUN_MASK as u8) << ML_BITS;
                    let mut rest = lit_len - RUN_MASK;
                    while rest >= 255 {
                        dst[op] = 255;
                        op += 1;
                        rest -= 255;
                    }
                    dst[op] = rest as u8;
                    op += 1;
                } else {
                    dst[token_pos] = (lit_len as u8) << ML_BITS;
                }
                dst[op..op + lit_len].copy_from_slice(&buf[anchor..ip]);
                op += lit_len;

                dst[op..op + 2].copy_from_slice(&((ip - mpos) as u16).to_le_bytes());
                op += 2;

                let ml = MINMATCH + count_common(buf, ip + MINMATCH, mpos + MINMATCH, match_limit);
                let ml_ext = ml - MINMATCH;
                if ml_ext >= ML_MASK {
                    if op + 1 + (ml_ext - ML_MASK) / 255 + LASTLITERALS > dst.len() {
                        return Err(Lz4Error::OutputTooSmall);
                    }
                    dst[token_pos] |= ML_MASK as u8;
                    let mut rest = ml_ext - ML_MASK;
                    while rest >= 255 {
                        dst[op] = 255;
                        op += 1;
                        rest -= 255;
                    }
                    dst[op] = rest as u8;
                    op += 1;
                } else {
                    dst[token_pos] |= ml_ext as u8;
                }

                ip += ml;
                anchor = ip;
                if ip > mf_limit {
                    break 'outer;
                }

                // Index the position the match skipped, then try an
                // immediate zero-literal follow-up match.
                let slot = table.hash_at(buf, ip - 2);
                table.put(slot, ip - 2);
                let slot = table.hash_at(buf, ip);
                let cand = table.candidate(slot, ip);
                table.put(slot, ip);
                if let Some(m) = cand {
                    if read_u32(buf, m) == read_u32(buf, ip) {
                        mpos = m;
                        continue;
                    }
                }
                ip += 1;
                break;
            }
        }
    }

    // ── Trailing literal run (every block ends with one).
    let last_run = src_end - anchor;
    let ext = if last_run >= RUN_MASK {
        1 + (last_run - RUN_MASK) / 255
    } else {
        0
    };
    if op + 1 + ext + last_run > dst.len() {
        return Err(Lz4Error::OutputTooSmall);
    }
    if last_run >= RUN_MASK {
        dst[op] = (RUN_MASK as u8) << ML_BITS;
        op += 1;
        let mut rest = last_run - RUN_MASK;
        while rest >= 255 {
            dst[op] = 255;
            op += 1;
            rest -= 255;
        }
        dst[op] = rest as u8;
        op += 1;
    } else {
        dst[op] = (last_run as u8) << ML_BITS;
        op += 1;
    }
    dst[op..op + last_run].copy_from_slice(&buf[anchor..src_end]);
    op += last_run;

    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::decompress::decompress;

    fn roundtrip(data: &[u8]) -> usize {
        let mut packed = vec![0u8; compress_bound(data.len())];
        let n = compress(data, &mut packed, 1).unwrap();
        let mut restored = vec![0u8; data.len()];
        let m = decompress(&packed[..n], &mut restored).unwrap();
        assert_eq!(m, data.len());
        assert_eq!(&restored, data);
        n
    }

    #[test]
    fn empty_input() {
        let mut dst = [0u8; 4];
        assert_eq!(compress(&[], &mut dst, 1).unwrap(), 1);
        assert_eq!(dst[0], 0);
    }

    #[test]
    fn tiny_input_is_all_literals() {
        let mut dst = [0u8; 32];
        let n = compress(b"hello", &mut dst, 1).unwrap();
        assert_eq!(&dst[..n], &[0x50, b'h', b'e', b'l', b'l', b'o']);
    }

    #[test]
    fn repetitive_input_shrinks() {
        let data = b"abcdefgh".repeat(512);
        let n = roundtrip(&data);
        assert!(n < data.len() / 4);
    }

    #[test]
    fn incompressible_input_survives() {
        // Pseudo-random bytes; expansion stays within compress_bound.
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        let data: Vec<u8> = (0..10_000)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                state as u8
            })
            .collect();
        let n = roundtrip(&data);
        assert!(n <= compress_bound(data.len()));
    }

    #[test]
    fn large_input_uses_wide_table() {
        let mut data = b"0123456789abcdef".repeat(5000); // 80 KB
        data.extend_from_slice(b"unaligned tail bytes");
        roundtrip(&data);
    }

    #[test]
    fn output_too_small_is_reported() {
        let data = b"no place to put this".repeat(8);
        let mut dst = vec![0u8; 8];
        assert!(matches!(
            compress(&data, &mut dst, 1),
            Err(Lz4Error::OutputTooSmall)
        ));
    }

    #[test]
    fn prefixed_compression_reaches_into_history() {
        // Second block repeats the first; with the first as prefix history
        // the second should compress to almost nothing.
        let chunk = b"the quick brown fox jumps over the lazy dog. ".repeat(40);
        let mut buf = Vec::new();
        buf.extend_from_slice(&chunk);
        let start = buf.len();
        buf.extend_from_slice(&chunk);

        let mut table = FastTable::wide();
        // Prime the table by compressing the prefix in place.
        let mut scratch = vec![0u8; compress_bound(start)];
        compress_with_table(&buf, 0, start, &mut scratch, &mut table, 1).unwrap();

        let mut packed = vec![0u8; compress_bound(chunk.len())];
        let n =
            compress_with_table(&buf, start, buf.len(), &mut packed, &mut table, 1).unwrap();
        assert!(n < chunk.len() / 8);

        let mut restored = vec![0u8; buf.len()];
        restored[..start].copy_from_slice(&chunk);
        let m = crate::block::decompress::decompress_into(
            &packed[..n],
            &mut restored,
            start,
            &[],
            None,
        )
        .unwrap();
        assert_eq!(m, chunk.len());
        assert_eq!(&restored[start..], &chunk[..]);
    }

    #[test]
    fn rebase_drops_stale_entries() {
        let mut table = FastTable::wide();
        table.put(0, 10);
        table.put(1, 100);
        table.rebase(50);
        assert_eq!(table.candidate(0, 1000), None);
        assert_eq!(table.candidate(1, 1000), Some(50));
    }
}
