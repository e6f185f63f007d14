//! Constants shared by the hash-chain and optimal-parse engines.

/// Hash-table log for the chain index (32768 heads).
pub const CHAIN_HASH_LOG: u32 = 15;

/// The chain table covers the full 64 KiB window, one slot per position.
pub const CHAIN_SIZE: usize = 65_536;
pub const CHAIN_MASK: usize = CHAIN_SIZE - 1;

/// Empty-slot sentinel for chain-index heads.
pub const CHAIN_EMPTY: u32 = u32::MAX;

/// Lookahead window of the optimal parser, in positions.
pub const OPT_NUM: usize = 4_096;

/// A match candidate: absolute position and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub pos: usize,
    pub len: usize,
}
