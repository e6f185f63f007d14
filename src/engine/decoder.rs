//! Decoder implementations mirroring the two encoders.

use crate::block::decompress::decompress_into;
use crate::engine::window::DecoderWindow;
use crate::engine::{check_tail_range, BlockDecoder};
use crate::error::Lz4Error;

/// Decoder for chained frames: keeps the last 64 KiB of decoded bytes so
/// cross-block references resolve.
pub struct ChainDecoder {
    window: DecoderWindow,
    last: usize,
}

impl ChainDecoder {
    pub fn new(block_size: usize) -> ChainDecoder {
        ChainDecoder {
            window: DecoderWindow::new(block_size),
            last: 0,
        }
    }
}

impl BlockDecoder for ChainDecoder {
    fn block_size(&self) -> usize {
        self.window.block_size()
    }

    fn bytes_ready(&self) -> usize {
        self.last
    }

    fn decode(&mut self, src: &[u8]) -> Result<usize, Lz4Error> {
        let block_size = self.window.block_size();
        self.window.prepare(block_size);
        let (out, head) = self.window.space(block_size);
        let produced = decompress_into(src, out, head, &[], None)?;
        self.window.advance(produced);
        self.last = produced;
        Ok(produced)
    }

    fn inject(&mut self, src: &[u8]) -> Result<usize, Lz4Error> {
        self.window.absorb(src);
        self.last = src.len().min(self.window.head());
        Ok(src.len())
    }

    fn drain(&mut self, dst: &mut [u8], offset: isize) -> Result<(), Lz4Error> {
        let back = check_tail_range(self.window.head(), offset, dst.len())?;
        dst.copy_from_slice(self.window.tail(back, dst.len()));
        Ok(())
    }

    fn peek(&self, offset: isize, len: usize) -> Result<&[u8], Lz4Error> {
        let back = check_tail_range(self.window.head(), offset, len)?;
        Ok(self.window.tail(back, len))
    }
}

/// Decoder for independent-block frames: one block of state, reset on
/// every decode.
pub struct IndependentDecoder {
    buf: Box<[u8]>,
    block_size: usize,
    last: usize,
}

impl IndependentDecoder {
    pub fn new(block_size: usize) -> IndependentDecoder {
        IndependentDecoder {
            buf: vec![0u8; block_size].into_boxed_slice(),
            block_size,
            last: 0,
        }
    }
}

impl BlockDecoder for IndependentDecoder {
    fn block_size(&self) -> usize {
        self.block_size
    }

    fn bytes_ready(&self) -> usize {
        self.last
    }

    fn decode(&mut self, src: &[u8]) -> Result<usize, Lz4Error> {
        let produced = decompress_into(src, &mut self.buf, 0, &[], None)?;
        self.last = produced;
        Ok(produced)
    }

    fn inject(&mut self, src: &[u8]) -> Result<usize, Lz4Error> {
        if src.len() > self.block_size {
            return Err(Lz4Error::MalformedStream("stored block exceeds block size"));
        }
        self.buf[..src.len()].copy_from_slice(src);
        self.last = src.len();
        Ok(src.len())
    }

    fn drain(&mut self, dst: &mut [u8], offset: isize) -> Result<(), Lz4Error> {
        let back = check_tail_range(self.last, offset, dst.len())?;
        let from = self.last - back;
        dst.copy_from_slice(&self.buf[from..from + dst.len()]);
        Ok(())
    }

    fn peek(&self, offset: isize, len: usize) -> Result<&[u8], Lz4Error> {
        let back = check_tail_range(self.last, offset, len)?;
        let from = self.last - back;
        Ok(&self.buf[from..from + len])
    }
}
