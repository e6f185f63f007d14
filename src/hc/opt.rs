//! Optimal parser (levels 10..=12).
//!
//! Instead of committing greedily, the parser prices every way to cover a
//! lookahead window (up to [`OPT_NUM`] positions) with literals and match
//! candidates, using the exact token cost model: 1 token byte, 2 offset
//! bytes, plus one extension byte per 255 units of length beyond the
//! nibble. It then emits the cheapest covering and slides the window.
//! Matches reaching the per-level `target_length` short-circuit the search
//! and are emitted immediately.

use crate::block::types::{
    count_back, LASTLITERALS, MFLIMIT, MINMATCH, MIN_LENGTH, ML_MASK, RUN_MASK,
};
use crate::error::Lz4Error;
use crate::hc::compress::{emit_last_literals, emit_sequence};
use crate::hc::search::ChainIndex;
use crate::hc::types::{Match, OPT_NUM};

/// One parse state: the cheapest known way to reach this window position.
#[derive(Debug, Clone, Copy)]
struct Node {
    price: i32,
    /// Match offset, 0 for a literal step.
    off: usize,
    /// Length of the final op reaching this node; 1 means a literal.
    mlen: usize,
    /// Length of the literal run this node sits in (0 after a match).
    litlen: usize,
}

const UNSET: Node = Node {
    price: i32::MAX / 2,
    off: 0,
    mlen: 1,
    litlen: 0,
};

/// Cost in bytes of a literal run of `len`.
#[inline]
fn literals_price(len: usize) -> i32 {
    let mut price = len;
    if len >= RUN_MASK {
        price += 1 + (len - RUN_MASK) / 255;
    }
    price as i32
}

/// Cost in bytes of a full sequence: `litlen` literals then a match of
/// `mlen`.
#[inline]
fn sequence_price(litlen: usize, mlen: usize) -> i32 {
    // Token byte + 2 offset bytes + the literal run.
    let mut total = 3 + literals_price(litlen);
    let ext = mlen - MINMATCH;
    if ext >= ML_MASK {
        total += 1 + ((ext - ML_MASK) / 255) as i32;
    }
    total
}

/// Compress `buf[src_start..src_end]` against `buf[..src_start]` history
/// with the optimal parser.
pub fn compress_optimal(
    buf: &[u8],
    src_start: usize,
    src_end: usize,
    dst: &mut [u8],
    index: &mut ChainIndex,
    nb_searches: u32,
    target_length: usize,
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
        let sufficient = target_length.min(OPT_NUM - 1).max(MINMATCH);
        let mut opt = vec![UNSET; OPT_NUM];
        let mut ops: Vec<(usize, usize, usize)> = Vec::new(); // (rel start, off, mlen)
        let mut ip = src_start;

        while ip <= mf_limit {
            let llen = ip - anchor;
            let Some(first) = index.search(buf, ip, MINMATCH, match_limit, nb_searches) else {
                ip += 1;
                continue;
            };

            // Long enough: no parse can beat taking it whole.
            if first.len >= sufficient {
                let back = count_back(buf, ip, first.pos, anchor, 0);
                let mstart = ip - back;
                let mpos = first.pos - back;
                let mlen = first.len + back;
                emit_sequence(buf, anchor, mstart, mstart - mpos, mlen, dst, &mut op)?;
                ip = mstart + mlen;
                anchor = ip;
                continue;
            }

            // ── Seed the window with the literal steps and the first match.
            opt.fill(UNSET);
            for i in 0..MINMATCH {
                opt[i] = Node {
                    price: literals_price(llen + i),
                    off: 0,
                    mlen: 1,
                    litlen: llen + i,
                };
            }
            for mlen in MINMATCH..=first.len {
                opt[mlen] = Node {
                    price: sequence_price(llen, mlen),
                    off: ip - first.pos,
                    mlen,
                    litlen: 0,
                };
            }
            let mut last = first.len;

            // ── Relax forward.
            let mut cur = 1;
            while cur < last {
                // Literal step to cur + 1.
                let lit = if opt[cur].mlen == 1 {
                    let run = opt[cur].litlen + 1;
                    Node {
                        price: opt[cur].price - literals_price(opt[cur].litlen)
                            + literals_price(run),
                        off: 0,
                        mlen: 1,
                        litlen: run,
                    }
                } else {
                    Node {
                        price: opt[cur].price + literals_price(1),
                        off: 0,
                        mlen: 1,
                        litlen: 1,
                    }
                };
                if lit.price < opt[cur + 1].price {
                    opt[cur + 1] = lit;
                }

                // Match steps from cur.
                if ip + cur <= mf_limit {
                    if let Some(Match { pos, len }) =
                        index.search(buf, ip + cur, MINMATCH, match_limit, nb_searches)
                    {
                        let cap = (OPT_NUM - 1).saturating_sub(cur);
                        let len = len.min(cap);
                        if len >= MINMATCH {
                            let (run, base) = if opt[cur].mlen == 1 {
                                (
                                    opt[cur].litlen,
                                    opt[cur].price - literals_price(opt[cur].litlen),
                                )
                            } else {
                                (0, opt[cur].price)
                            };
                            let off = ip + cur - pos;
                            for mlen in MINMATCH..=len {
                                let reach = cur + mlen;
                                let price = base + sequence_price(run, mlen);
                                if reach > last {
                                    last = reach;
                                }
                                if price < opt[reach].price {
                                    opt[reach] = Node {
                                        price,
                                        off,
                                        mlen,
                                        litlen: 0,
                                    };
                                }
                            }
                        }
                    }
                }
                cur += 1;
            }

            // ── Walk back the cheapest covering, then emit in order.
            ops.clear();
            let mut pos = last;
            while pos > 0 {
                let node = opt[pos];
                if node.mlen == 1 {
                    pos -= 1;
                } else {
                    ops.push((pos - node.mlen, node.off, node.mlen));
                    pos -= node.mlen;
                }
            }
            for &(rel, off, mlen) in ops.iter().rev() {
                let mstart = ip + rel;
                emit_sequence(buf, anchor, mstart, off, mlen, dst, &mut op)?;
                anchor = mstart + mlen;
            }
            ip += last;
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
    use crate::hc::search::ChainIndex;

    fn opt_roundtrip(data: &[u8]) -> usize {
        let mut dst = vec![0u8; compress_bound(data.len())];
        let mut index = ChainIndex::new();
        let n =
            compress_optimal(data, 0, data.len(), &mut dst, &mut index, 512, 128).unwrap();
        let mut out = vec![0u8; data.len()];
        assert_eq!(decompress(&dst[..n], &mut out).unwrap(), data.len());
        assert_eq!(out, data);
        n
    }

    #[test]
    fn price_model_is_exact_for_simple_runs() {
        assert_eq!(literals_price(0), 0);
        assert_eq!(literals_price(14), 14);
        assert_eq!(literals_price(15), 16); // nibble saturates, one extension byte
        assert_eq!(literals_price(270), 272);
        assert_eq!(sequence_price(0, 4), 3);
        assert_eq!(sequence_price(0, 19), 4);
        assert_eq!(sequence_price(2, 4), 5);
    }

    #[test]
    fn empty_input() {
        let mut dst = [0u8; 4];
        let mut index = ChainIndex::new();
        assert_eq!(
            compress_optimal(b"", 0, 0, &mut dst, &mut index, 512, 128).unwrap(),
            1
        );
    }

    #[test]
    fn roundtrips_structured_data() {
        let mut data = Vec::new();
        for i in 0u32..2000 {
            data.extend_from_slice(format!("<item id=\"{}\" state=\"ok\"/>", i % 50).as_bytes());
        }
        let n = opt_roundtrip(&data);
        assert!(n < data.len() / 5);
    }

    #[test]
    fn roundtrips_long_runs() {
        // Long runs exercise the sufficient-length fast path.
        let mut data = vec![0u8; 50_000];
        for (i, b) in data.iter_mut().enumerate() {
            *b = if i % 5000 < 4900 { 0xAA } else { (i % 251) as u8 };
        }
        opt_roundtrip(&data);
    }

    #[test]
    fn not_worse_than_hash_chain() {
        let data = b"abcabcabcabcXabcabcabcabcYabcabcabcabcZ".repeat(200);
        let mut dst = vec![0u8; compress_bound(data.len())];
        let mut index = ChainIndex::new();
        let hc = crate::hc::compress::compress_hash_chain(
            &data,
            0,
            data.len(),
            &mut dst,
            &mut index,
            256,
        )
        .unwrap();
        let opt = opt_roundtrip(&data);
        assert!(opt <= hc + hc / 50);
    }
}
