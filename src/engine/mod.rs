//! Streaming block engines: stateful encoders and decoders that carry
//! match history across blocks.
//!
//! Encoders accumulate plain bytes with `topup`, then `encode` seals the
//! pending block. Decoders rebuild the same history: compressed blocks go
//! through `decode`, stored (uncompressed) blocks through `inject`, and
//! plain bytes come back out with `drain`/`peek` at negative offsets from
//! the newest decoded byte.

pub mod decoder;
pub mod encoder;
pub mod window;

pub use decoder::{ChainDecoder, IndependentDecoder};
pub use encoder::{ChainEncoder, IndependentEncoder};

use crate::error::Lz4Error;
use crate::level::Level;

/// What `encode` produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedBlock {
    /// Nothing pending, nothing written.
    None,
    /// Incompressible: the block was written verbatim, `0` bytes saved.
    Copied(usize),
    /// A compressed block of the given length was written.
    Encoded(usize),
}

impl EncodedBlock {
    pub fn length(&self) -> usize {
        match *self {
            EncodedBlock::None => 0,
            EncodedBlock::Copied(n) | EncodedBlock::Encoded(n) => n,
        }
    }
}

/// Stateful block encoder.
pub trait BlockEncoder: Send {
    /// Fixed block size this encoder seals at.
    fn block_size(&self) -> usize;

    /// Bytes accumulated for the next block.
    fn bytes_ready(&self) -> usize;

    /// Take as much of `src` as fits in the pending block.
    fn topup(&mut self, src: &[u8]) -> usize;

    /// Seal the pending block into `dst`. With `allow_copy`, incompressible
    /// blocks are emitted verbatim as [`EncodedBlock::Copied`].
    fn encode(&mut self, dst: &mut [u8], allow_copy: bool) -> Result<EncodedBlock, Lz4Error>;

    /// Topup, then encode when the block filled (or when `force` and
    /// anything is pending). Returns bytes consumed from `src` plus the
    /// encode outcome.
    fn topup_and_encode(
        &mut self,
        src: &[u8],
        dst: &mut [u8],
        force: bool,
        allow_copy: bool,
    ) -> Result<(usize, EncodedBlock), Lz4Error> {
        let loaded = self.topup(src);
        let ready = self.bytes_ready();
        if ready >= self.block_size() || (force && ready > 0) {
            let block = self.encode(dst, allow_copy)?;
            Ok((loaded, block))
        } else {
            Ok((loaded, EncodedBlock::None))
        }
    }
}

/// Stateful block decoder.
pub trait BlockDecoder: Send {
    /// Largest block this decoder accepts.
    fn block_size(&self) -> usize;

    /// Length of the most recently decoded or injected block.
    fn bytes_ready(&self) -> usize;

    /// Decode one compressed block; returns the decoded length.
    fn decode(&mut self, src: &[u8]) -> Result<usize, Lz4Error>;

    /// Record one stored block as history; returns its length.
    fn inject(&mut self, src: &[u8]) -> Result<usize, Lz4Error>;

    /// Copy `dst.len()` decoded bytes starting `offset` bytes back from the
    /// head (`offset` is negative).
    fn drain(&mut self, dst: &mut [u8], offset: isize) -> Result<(), Lz4Error>;

    /// Borrow `len` decoded bytes starting `offset` bytes back from the
    /// head (`offset` is negative).
    fn peek(&self, offset: isize, len: usize) -> Result<&[u8], Lz4Error>;
}

/// Build the encoder matching a frame's linkage and level.
pub fn new_encoder(
    chaining: bool,
    level: Level,
    block_size: usize,
    extra_blocks: usize,
) -> Box<dyn BlockEncoder> {
    if chaining {
        Box::new(ChainEncoder::new(level, block_size, extra_blocks))
    } else {
        Box::new(IndependentEncoder::new(level, block_size))
    }
}

/// Build the decoder matching a frame's linkage.
pub fn new_decoder(chaining: bool, block_size: usize) -> Box<dyn BlockDecoder> {
    if chaining {
        Box::new(ChainDecoder::new(block_size))
    } else {
        Box::new(IndependentDecoder::new(block_size))
    }
}

pub(crate) fn check_tail_range(head: usize, offset: isize, len: usize) -> Result<usize, Lz4Error> {
    let back = offset
        .checked_neg()
        .filter(|n| *n >= 0)
        .map(|n| n as usize)
        .ok_or(Lz4Error::MalformedStream("positive drain offset"))?;
    if back > head || len > back {
        return Err(Lz4Error::MalformedStream("drain range outside window"));
    }
    Ok(back)
}
