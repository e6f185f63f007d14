//! Size-classed pool for block staging buffers.
//!
//! Frame sessions allocate one staging buffer per open frame (up to the
//! worst-case compressed size of a 4 MiB block) and return it on close.
//! Pooling those keeps steady-state streaming allocation-free. Requests
//! below the smallest class are not worth pooling and come straight from
//! the allocator.

use std::sync::{Mutex, OnceLock};

/// Smallest pooled buffer; anything below allocates directly.
const MIN_POOLED: usize = 128 * 1024;
/// One shelf per power of two from `MIN_POOLED` up to 8 MiB.
const SHELVES: usize = 7;
/// Retained buffers per shelf.
const SHELF_DEPTH: usize = 8;

pub struct BufferPool {
    shelves: Mutex<[Vec<Vec<u8>>; SHELVES]>,
}

impl BufferPool {
    pub fn new() -> BufferPool {
        BufferPool {
            shelves: Mutex::new(Default::default()),
        }
    }

    /// The process-wide pool.
    pub fn global() -> &'static BufferPool {
        static GLOBAL: OnceLock<BufferPool> = OnceLock::new();
        GLOBAL.get_or_init(BufferPool::new)
    }

    fn shelf_for(size: usize) -> Option<usize> {
        if size > MIN_POOLED << (SHELVES - 1) {
            return None;
        }
        let mut class = 0;
        while MIN_POOLED << class < size {
            class += 1;
        }
        Some(class)
    }

    /// A zeroed buffer of exactly `size` bytes (capacity may be larger).
    pub fn alloc(&self, size: usize) -> Vec<u8> {
        if size < MIN_POOLED {
            return vec![0u8; size];
        }
        let Some(class) = Self::shelf_for(size) else {
            return vec![0u8; size];
        };
        let recycled = match self.shelves.lock() {
            Ok(mut shelves) => shelves[class].pop(),
            Err(_) => None,
        };
        let mut buf = recycled.unwrap_or_else(|| Vec::with_capacity(MIN_POOLED << class));
        buf.clear();
        buf.resize(size, 0);
        buf
    }

    /// Hand a buffer back. Wrong-sized or overflow buffers are dropped.
    pub fn free(&self, buf: Vec<u8>) {
        let Some(class) = Self::shelf_for(buf.capacity()) else {
            return;
        };
        if buf.capacity() < MIN_POOLED || buf.capacity() != MIN_POOLED << class {
            return;
        }
        if let Ok(mut shelves) = self.shelves.lock() {
            if shelves[class].len() < SHELF_DEPTH {
                shelves[class].push(buf);
            }
        }
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        BufferPool::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_requests_bypass_the_pool() {
        let pool = BufferPool::new();
        let buf = pool.alloc(1000);
        assert_eq!(buf.len(), 1000);
        pool.free(buf);
        assert!(pool.shelves.lock().unwrap().iter().all(|s| s.is_empty()));
    }

    #[test]
    fn buffers_recycle_within_their_class() {
        let pool = BufferPool::new();
        let mut buf = pool.alloc(200 * 1024);
        buf[0] = 7;
        let cap = buf.capacity();
        pool.free(buf);
        let again = pool.alloc(150 * 1024);
        assert_eq!(again.capacity(), cap);
        assert_eq!(again.len(), 150 * 1024);
        assert_eq!(again[0], 0); // rezeroed
    }

    #[test]
    fn shelves_have_finite_depth() {
        let pool = BufferPool::new();
        let bufs: Vec<_> = (0..SHELF_DEPTH + 3).map(|_| pool.alloc(MIN_POOLED)).collect();
        for b in bufs {
            pool.free(b);
        }
        let shelves = pool.shelves.lock().unwrap();
        assert_eq!(shelves[0].len(), SHELF_DEPTH);
    }
}
