//! Thin wrapper around the `xxhash-rust` crate providing the XXH32 API used
//! by the rest of this crate.
//!
//! Only XXH32 is needed: the frame format uses it for the descriptor
//! checksum, block checksums and the content checksum, always seeded with 0.

pub use xxhash_rust::xxh32::Xxh32 as Xxh32State;

/// One-shot XXH32 hash.
#[inline]
pub fn xxh32_oneshot(data: &[u8], seed: u32) -> u32 {
    xxhash_rust::xxh32::xxh32(data, seed)
}
