//! Fixed scratch buffer for frame header and block-length fields.
//!
//! Every header element is at most [`super::descriptor::MAX_HEADER_SIZE`]
//! bytes, so the sessions never heap-allocate for protocol plumbing: the
//! reader parses fields out of the stash, the writer composes them into it
//! and flushes it as one chunk.

use crate::frame::descriptor::MAX_HEADER_SIZE;

pub struct Stash {
    data: [u8; MAX_HEADER_SIZE],
    head: usize,
}

impl Stash {
    pub fn new() -> Stash {
        Stash {
            data: [0u8; MAX_HEADER_SIZE],
            head: 0,
        }
    }

    pub fn clear(&mut self) {
        self.head = 0;
    }

    pub fn len(&self) -> usize {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.head]
    }

    /// Mutable room for `len` incoming bytes; commit with [`Stash::advance`].
    pub fn space(&mut self, len: usize) -> &mut [u8] {
        &mut self.data[self.head..self.head + len]
    }

    pub fn advance(&mut self, len: usize) {
        self.head += len;
    }

    // ── Writer side: append little-endian fields.

    pub fn poke1(&mut self, value: u8) {
        self.data[self.head] = value;
        self.head += 1;
    }

    pub fn poke4(&mut self, value: u32) {
        self.data[self.head..self.head + 4].copy_from_slice(&value.to_le_bytes());
        self.head += 4;
    }

    pub fn poke8(&mut self, value: u64) {
        self.data[self.head..self.head + 8].copy_from_slice(&value.to_le_bytes());
        self.head += 8;
    }

    // ── Reader side: consume the newest field from the tail.

    pub fn last1(&self) -> u8 {
        self.data[self.head - 1]
    }

    pub fn last4(&self) -> u32 {
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.data[self.head - 4..self.head]);
        u32::from_le_bytes(b)
    }

    pub fn last8(&self) -> u64 {
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.data[self.head - 8..self.head]);
        u64::from_le_bytes(b)
    }
}

impl Default for Stash {
    fn default() -> Self {
        Stash::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pokes_accumulate_and_lasts_read_back() {
        let mut s = Stash::new();
        s.poke1(0xAB);
        s.poke4(0x1122_3344);
        assert_eq!(s.len(), 5);
        assert_eq!(s.last4(), 0x1122_3344);
        assert_eq!(s.as_slice(), &[0xAB, 0x44, 0x33, 0x22, 0x11]);
        s.clear();
        s.poke8(0x0102_0304_0506_0708);
        assert_eq!(s.last8(), 0x0102_0304_0506_0708);
        assert_eq!(s.last1(), 0x01);
    }

    #[test]
    fn space_then_advance_mimics_a_read() {
        let mut s = Stash::new();
        s.space(4).copy_from_slice(&0x2204_4D18u32.to_le_bytes());
        s.advance(4);
        assert_eq!(s.last4(), 0x2204_4D18);
    }
}
