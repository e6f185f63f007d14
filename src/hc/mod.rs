//! High-compression engines: hash-chain search, greedy-with-lookahead
//! parsing (levels 3..=9) and optimal parsing (levels 10..=12).

pub mod compress;
pub mod opt;
pub mod search;
pub mod types;

pub use search::ChainIndex;

use crate::error::Lz4Error;
use crate::level::Level;

/// Compress `buf[src_start..src_end]` against `buf[..src_start]`, picking
/// the engine for `level`. `level` must be a high level.
pub fn compress_with_index(
    buf: &[u8],
    src_start: usize,
    src_end: usize,
    dst: &mut [u8],
    index: &mut ChainIndex,
    level: Level,
) -> Result<usize, Lz4Error> {
    debug_assert!(level.is_high());
    let params = level.params();
    if level.is_optimal() {
        opt::compress_optimal(
            buf,
            src_start,
            src_end,
            dst,
            index,
            params.nb_searches,
            params.target_length,
        )
    } else {
        compress::compress_hash_chain(buf, src_start, src_end, dst, index, params.nb_searches)
    }
}

/// One-shot high compression with a throwaway index.
pub fn compress(src: &[u8], dst: &mut [u8], level: Level) -> Result<usize, Lz4Error> {
    let mut index = ChainIndex::new();
    compress_with_index(src, 0, src.len(), dst, &mut index, level)
}
