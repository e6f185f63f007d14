//! Frame descriptor: everything the fixed-size frame header carries.
//!
//! Wire layout: 4-byte little-endian magic, FLG byte, BD byte, optional
//! 8-byte content length, optional 4-byte dictionary id, then a 1-byte
//! checksum over the descriptor bytes (FLG through dictionary id).
//!
//! FLG bits: 7..6 version (must be 01), 5 block independence, 4 block
//! checksums, 3 content length present, 2 content checksum present,
//! 0 dictionary id present. BD bits 6..4 hold the block-size code.

use crate::xxhash::xxh32_oneshot;

/// LZ4 frame magic number (stored little-endian).
pub const MAGIC: u32 = 0x184D_2204;

/// Largest encodable header: magic + FLG + BD + u64 + u32 + checksum.
pub const MAX_HEADER_SIZE: usize = 4 + 2 + 8 + 4 + 1;

/// Maximum block size, selected by the BD byte's 3-bit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockSize {
    #[default]
    Max64Kb = 4,
    Max256Kb = 5,
    Max1Mb = 6,
    Max4Mb = 7,
}

impl BlockSize {
    pub fn bytes(self) -> usize {
        match self {
            BlockSize::Max64Kb => 64 * 1024,
            BlockSize::Max256Kb => 256 * 1024,
            BlockSize::Max1Mb => 1024 * 1024,
            BlockSize::Max4Mb => 4 * 1024 * 1024,
        }
    }

    pub fn from_code(code: u8) -> Option<BlockSize> {
        match code {
            4 => Some(BlockSize::Max64Kb),
            5 => Some(BlockSize::Max256Kb),
            6 => Some(BlockSize::Max1Mb),
            7 => Some(BlockSize::Max4Mb),
            _ => None,
        }
    }

    /// Smallest block size that still holds `length` bytes, so short
    /// inputs do not pay for a 4 MiB staging buffer.
    pub fn fitting(length: u64) -> BlockSize {
        match length {
            0..=0x1_0000 => BlockSize::Max64Kb,
            0x1_0001..=0x4_0000 => BlockSize::Max256Kb,
            0x4_0001..=0x10_0000 => BlockSize::Max1Mb,
            _ => BlockSize::Max4Mb,
        }
    }
}

/// Parsed (or to-be-written) frame descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Declared plain-text length, when the producer knew it.
    pub content_length: Option<u64>,
    /// Whole-frame XXH32 over the plain bytes.
    pub content_checksum: bool,
    /// Blocks may reference the previous 64 KiB when `true`.
    pub chaining: bool,
    /// Per-block XXH32 checksums.
    pub block_checksum: bool,
    /// Predefined-dictionary id; parsed but not supported.
    pub dictionary_id: Option<u32>,
    pub block_size: BlockSize,
}

impl Default for Descriptor {
    fn default() -> Descriptor {
        Descriptor {
            content_length: None,
            content_checksum: false,
            chaining: true,
            block_checksum: false,
            dictionary_id: None,
            block_size: BlockSize::Max64Kb,
        }
    }
}

impl Descriptor {
    pub fn flg_byte(&self) -> u8 {
        let mut flg = 0b0100_0000u8; // version 01
        if !self.chaining {
            flg |= 1 << 5;
        }
        if self.block_checksum {
            flg |= 1 << 4;
        }
        if self.content_length.is_some() {
            flg |= 1 << 3;
        }
        if self.content_checksum {
            flg |= 1 << 2;
        }
        if self.dictionary_id.is_some() {
            flg |= 1;
        }
        flg
    }

    pub fn bd_byte(&self) -> u8 {
        (self.block_size as u8) << 4
    }
}

/// Descriptor checksum: second byte of the XXH32 over the descriptor
/// bytes (everything after the magic, before the checksum itself).
#[inline]
pub fn header_checksum(descriptor_bytes: &[u8]) -> u8 {
    (xxh32_oneshot(descriptor_bytes, 0) >> 8) as u8
}
