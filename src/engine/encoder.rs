//! Encoder implementations: chained (history carried across blocks) and
//! independent (each block stands alone).

use crate::block::compress::{compress_with_table, FastTable};
use crate::codec::encode_block;
use crate::engine::window::EncoderWindow;
use crate::engine::{BlockEncoder, EncodedBlock};
use crate::error::Lz4Error;
use crate::hc::{self, ChainIndex};
use crate::level::Level;

enum Index {
    Fast(FastTable),
    Chain(ChainIndex),
}

/// Encoder for chained frames: every block may reference the previous
/// 64 KiB of plain input.
pub struct ChainEncoder {
    window: EncoderWindow,
    index: Index,
    level: Level,
}

impl ChainEncoder {
    pub fn new(level: Level, block_size: usize, extra_blocks: usize) -> ChainEncoder {
        let index = if level.is_high() {
            Index::Chain(ChainIndex::new())
        } else {
            Index::Fast(FastTable::wide())
        };
        ChainEncoder {
            window: EncoderWindow::new(block_size, extra_blocks),
            index,
            level,
        }
    }
}

impl BlockEncoder for ChainEncoder {
    fn block_size(&self) -> usize {
        self.window.block_size()
    }

    fn bytes_ready(&self) -> usize {
        self.window.pending()
    }

    fn topup(&mut self, src: &[u8]) -> usize {
        self.window.topup(src)
    }

    fn encode(&mut self, dst: &mut [u8], allow_copy: bool) -> Result<EncodedBlock, Lz4Error> {
        let pending = self.window.pending();
        if pending == 0 {
            return Ok(EncodedBlock::None);
        }

        let (buf, start, end) = self.window.view();
        let result = match &mut self.index {
            Index::Fast(table) => compress_with_table(buf, start, end, dst, table, 1),
            Index::Chain(index) => hc::compress_with_index(buf, start, end, dst, index, self.level),
        };
        let written = match result {
            Ok(n) => n,
            // The block did not fit; verbatim output may still.
            Err(Lz4Error::OutputTooSmall) if allow_copy && dst.len() >= pending => pending,
            Err(e) => return Err(e),
        };

        let outcome = if allow_copy && written >= pending {
            if dst.len() < pending {
                return Err(Lz4Error::OutputTooSmall);
            }
            let (buf, start, end) = self.window.view();
            dst[..pending].copy_from_slice(&buf[start..end]);
            EncodedBlock::Copied(pending)
        } else {
            EncodedBlock::Encoded(written)
        };

        if let Some(delta) = self.window.commit() {
            match &mut self.index {
                Index::Fast(table) => table.rebase(delta),
                // Chain deltas are position-keyed; rebuild lazily instead.
                Index::Chain(index) => index.reset(),
            }
        }
        Ok(outcome)
    }
}

/// Encoder for independent-block frames: no history survives a block
/// boundary, so any block can be decoded alone.
pub struct IndependentEncoder {
    buf: Vec<u8>,
    block_size: usize,
    level: Level,
}

impl IndependentEncoder {
    pub fn new(level: Level, block_size: usize) -> IndependentEncoder {
        IndependentEncoder {
            buf: Vec::with_capacity(block_size),
            block_size,
            level,
        }
    }
}

impl BlockEncoder for IndependentEncoder {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn bytes_ready(&self) -> usize {
        self.buf.len()
    }

    fn topup(&mut self, src: &[u8]) -> usize {
        let take = src.len().min(self.block_size - self.buf.len());
        self.buf.extend_from_slice(&src[..take]);
        take
    }

    fn encode(&mut self, dst: &mut [u8], allow_copy: bool) -> Result<EncodedBlock, Lz4Error> {
        let pending = self.buf.len();
        if pending == 0 {
            return Ok(EncodedBlock::None);
        }

        let written = match encode_block(&self.buf, dst, self.level) {
            Ok(n) => n,
            Err(Lz4Error::OutputTooSmall) if allow_copy && dst.len() >= pending => pending,
            Err(e) => return Err(e),
        };

        let outcome = if allow_copy && written >= pending {
            if dst.len() < pending {
                return Err(Lz4Error::OutputTooSmall);
            }
            dst[..pending].copy_from_slice(&self.buf);
            EncodedBlock::Copied(pending)
        } else {
            EncodedBlock::Encoded(written)
        };
        self.buf.clear();
        Ok(outcome)
    }
}
