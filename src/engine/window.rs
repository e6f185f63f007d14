//! Contiguous-history ring buffers for the chained-block engines.
//!
//! Both sides keep the previous 64 KiB of plain bytes immediately before
//! the working position, so match offsets can always be resolved in one
//! slice. When the write cursor would run past the end, the window compacts:
//! the most recent 64 KiB moves to the front and every recorded position
//! shifts down by the returned delta.

use crate::block::types::DISTANCE_MAX;

/// Dictionary span kept across compaction.
pub const HISTORY: usize = DISTANCE_MAX + 1;

/// Cursor margin so wide reads near the head never leave the buffer.
pub const TAIL_MARGIN: usize = 8;

/// Encoder-side window: `buf[..start]` is history, `buf[start..head]` is the
/// block being accumulated.
pub struct EncoderWindow {
    buf: Box<[u8]>,
    block_size: usize,
    start: usize,
    head: usize,
}

impl EncoderWindow {
    /// `extra_blocks` widens the ring so more blocks fit between
    /// compactions; zero is fully functional.
    pub fn new(block_size: usize, extra_blocks: usize) -> EncoderWindow {
        let len = HISTORY + (1 + extra_blocks) * block_size + TAIL_MARGIN;
        EncoderWindow {
            buf: vec![0u8; len].into_boxed_slice(),
            block_size,
            start: 0,
            head: 0,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Bytes accumulated for the current block.
    pub fn pending(&self) -> usize {
        self.head - self.start
    }

    /// Copy as much of `src` as the current block accepts. Returns the
    /// number of bytes taken.
    pub fn topup(&mut self, src: &[u8]) -> usize {
        let room = self.block_size - self.pending();
        let take = src.len().min(room);
        self.buf[self.head..self.head + take].copy_from_slice(&src[..take]);
        self.head += take;
        take
    }

    /// The whole buffer plus the span of the pending block, for the
    /// compressors' `(buf, src_start, src_end)` contract.
    pub fn view(&self) -> (&[u8], usize, usize) {
        (&self.buf, self.start, self.head)
    }

    /// Seal the pending block into history and make room for the next one.
    /// Returns the compaction delta when the window slid, for index
    /// rebasing.
    pub fn commit(&mut self) -> Option<usize> {
        self.start = self.head;
        if self.head + self.block_size + TAIL_MARGIN <= self.buf.len() {
            return None;
        }
        let keep = self.head.min(HISTORY);
        let delta = self.head - keep;
        self.buf.copy_within(delta..self.head, 0);
        self.start = keep;
        self.head = keep;
        Some(delta)
    }
}

/// Decoder-side window: `buf[..head]` is decoded history; blocks decode in
/// place at `head` so back-references resolve against the same slice.
pub struct DecoderWindow {
    buf: Box<[u8]>,
    block_size: usize,
    head: usize,
}

impl DecoderWindow {
    pub fn new(block_size: usize) -> DecoderWindow {
        DecoderWindow {
            buf: vec![0u8; HISTORY + block_size + TAIL_MARGIN].into_boxed_slice(),
            block_size,
            head: 0,
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// Make room for `length` bytes at the head, compacting if needed.
    pub fn prepare(&mut self, length: usize) {
        if self.head + length + TAIL_MARGIN <= self.buf.len() {
            return;
        }
        let keep = self.head.min(HISTORY);
        self.buf.copy_within(self.head - keep..self.head, 0);
        self.head = keep;
    }

    /// Window contents up to capacity for `length` more bytes, mutable,
    /// together with the decode position.
    pub fn space(&mut self, length: usize) -> (&mut [u8], usize) {
        let cap = (self.head + length).min(self.buf.len() - TAIL_MARGIN);
        (&mut self.buf[..cap], self.head)
    }

    pub fn advance(&mut self, produced: usize) {
        self.head += produced;
    }

    /// Store already-plain bytes as history (uncompressed blocks). Anything
    /// up to the block size is kept whole; longer inputs keep their newest
    /// [`HISTORY`] bytes.
    pub fn absorb(&mut self, src: &[u8]) {
        self.prepare(src.len());
        if self.head + src.len() + TAIL_MARGIN <= self.buf.len() {
            self.buf[self.head..self.head + src.len()].copy_from_slice(src);
            self.head += src.len();
            return;
        }
        let keep = src.len().min(HISTORY);
        self.buf[..keep].copy_from_slice(&src[src.len() - keep..]);
        self.head = keep;
    }

    /// Decoded bytes at a negative offset from the head.
    pub fn tail(&self, offset: usize, len: usize) -> &[u8] {
        &self.buf[self.head - offset..self.head - offset + len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoder_topup_respects_block_size() {
        let mut w = EncoderWindow::new(16, 0);
        assert_eq!(w.topup(&[1u8; 10]), 10);
        assert_eq!(w.topup(&[2u8; 10]), 6);
        assert_eq!(w.pending(), 16);
        assert_eq!(w.topup(&[3u8; 4]), 0);
    }

    #[test]
    fn encoder_compaction_keeps_history() {
        let block = 1024;
        let mut w = EncoderWindow::new(block, 0);
        let mut wrote = 0usize;
        let mut delta_seen = false;
        for round in 0..200u32 {
            let chunk = vec![(round % 251) as u8; block];
            assert_eq!(w.topup(&chunk), block);
            wrote += block;
            if let Some(delta) = w.commit() {
                delta_seen = true;
                assert!(delta > 0);
                let (_, start, head) = w.view();
                assert_eq!(start, head);
                assert!(head <= HISTORY);
            }
        }
        assert!(delta_seen);
        assert!(wrote > HISTORY);
    }

    #[test]
    fn decoder_compaction_preserves_recent_bytes() {
        let mut w = DecoderWindow::new(100);
        // Fill with a recognizable ramp via absorb.
        for i in 0..2000u32 {
            w.absorb(&[(i % 256) as u8; 50]);
        }
        let last = w.tail(1, 1)[0];
        assert_eq!(last, (1999 % 256) as u8);
        assert!(w.head() <= HISTORY + 100 + TAIL_MARGIN);
    }

    #[test]
    fn absorb_of_huge_input_keeps_only_history() {
        let mut w = DecoderWindow::new(64);
        let big: Vec<u8> = (0..HISTORY + 500).map(|i| (i % 241) as u8).collect();
        w.absorb(&big);
        assert_eq!(w.head(), HISTORY);
        assert_eq!(w.tail(1, 1)[0], big[big.len() - 1]);
    }
}
