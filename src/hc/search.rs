//! Hash-chain match index.
//!
//! Heads map a 4-byte fingerprint to the most recent position that carried
//! it; the chain table links each position to the previous one with the
//! same fingerprint as a 16-bit backward delta (0 terminates the chain).
//! The chain table is a 64 KiB ring indexed by the low 16 position bits, so
//! entries older than the match window fall out by being overwritten.

use crate::block::types::{count_common, hash4, read_u32, DISTANCE_MAX, MINMATCH};
use crate::hc::types::{Match, CHAIN_EMPTY, CHAIN_HASH_LOG, CHAIN_MASK, CHAIN_SIZE};

pub struct ChainIndex {
    heads: Box<[u32]>,
    chain: Box<[u16]>,
    /// First position not yet indexed; insertion is lazy.
    next: usize,
}

impl ChainIndex {
    pub fn new() -> ChainIndex {
        ChainIndex {
            heads: vec![CHAIN_EMPTY; 1 << CHAIN_HASH_LOG].into_boxed_slice(),
            chain: vec![0u16; CHAIN_SIZE].into_boxed_slice(),
            next: 0,
        }
    }

    /// Forget everything. Used after window compaction: chain deltas are
    /// keyed by absolute position and cannot be rebased in place, so the
    /// index rebuilds lazily from position 0 on the next search.
    pub fn reset(&mut self) {
        self.heads.fill(CHAIN_EMPTY);
        self.chain.fill(0);
        self.next = 0;
    }

    /// Index all positions up to (not including) `target`.
    /// Requires `target + 4 <= buf.len()`.
    pub fn insert_up_to(&mut self, buf: &[u8], target: usize) {
        for pos in self.next..target {
            let slot = hash4(read_u32(buf, pos), CHAIN_HASH_LOG);
            let head = self.heads[slot];
            let delta = if head == CHAIN_EMPTY {
                0
            } else {
                pos - head as usize
            };
            self.chain[pos & CHAIN_MASK] = if delta > u16::MAX as usize {
                0
            } else {
                delta as u16
            };
            self.heads[slot] = pos as u32;
        }
        self.next = self.next.max(target);
    }

    /// Best match at `ip` of length at least `min_len`, walking at most
    /// `budget` chain candidates. Match bytes never cross `limit`.
    pub fn search(
        &mut self,
        buf: &[u8],
        ip: usize,
        min_len: usize,
        limit: usize,
        budget: u32,
    ) -> Option<Match> {
        debug_assert!(min_len >= MINMATCH);
        self.insert_up_to(buf, ip);

        let slot = hash4(read_u32(buf, ip), CHAIN_HASH_LOG);
        let mut cand = match self.heads[slot] {
            CHAIN_EMPTY => return None,
            head => head as usize,
        };

        let mut best: Option<Match> = None;
        let mut best_len = min_len - 1;
        let mut attempts = budget;
        loop {
            if ip - cand > DISTANCE_MAX || attempts == 0 {
                break;
            }
            attempts -= 1;
            // Screen on the byte that would extend the best match before
            // paying for a full count. Stale ring entries fail here or in
            // the 4-byte check; they never corrupt the output.
            if ip + best_len < limit
                && buf[cand + best_len] == buf[ip + best_len]
                && read_u32(buf, cand) == read_u32(buf, ip)
            {
                let len = count_common(buf, ip, cand, limit);
                if len > best_len {
                    best_len = len;
                    best = Some(Match { pos: cand, len });
                }
            }
            let delta = self.chain[cand & CHAIN_MASK] as usize;
            if delta == 0 || delta > cand {
                break;
            }
            cand -= delta;
        }
        best
    }
}

impl Default for ChainIndex {
    fn default() -> Self {
        ChainIndex::new()
    }
}
