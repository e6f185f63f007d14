//! One-shot block codec entry points, shared by the independent-block
//! engine, the pickler and direct callers.

use crate::block;
use crate::error::Lz4Error;
use crate::hc;
use crate::level::Level;

/// Compress `src` into `dst` as a single block. Returns bytes written.
/// Size `dst` with [`crate::block::compress_bound`] to make failure
/// impossible.
pub fn encode_block(src: &[u8], dst: &mut [u8], level: Level) -> Result<usize, Lz4Error> {
    if level.is_high() {
        hc::compress(src, dst, level)
    } else {
        block::compress(src, dst, 1)
    }
}

/// Decompress a single block into `dst`. Returns the decoded length.
pub fn decode_block(src: &[u8], dst: &mut [u8]) -> Result<usize, Lz4Error> {
    block::decompress(src, dst)
}
