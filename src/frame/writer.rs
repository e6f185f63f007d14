//! Frame encoding session, transport-free.
//!
//! [`FrameWriter`] mirrors [`FrameReader`](crate::frame::reader::FrameReader):
//! it stages everything it produces (header bytes, block headers, block
//! payloads) and the driver moves staged bytes to wherever they go. The
//! contract is simple: after [`FrameWriter::open`], [`FrameWriter::write`]
//! or [`FrameWriter::finish_step`], flush [`FrameWriter::pending`] and call
//! [`FrameWriter::clear_pending`] before the next step.
//!
//! Checksummed and dictionary-seeded frames are read but not produced;
//! constructing a writer with such a descriptor fails with
//! [`Lz4Error::UnsupportedFeature`].

use crate::block::compress_bound;
use crate::engine::{new_encoder, BlockEncoder, EncodedBlock};
use crate::error::Lz4Error;
use crate::frame::descriptor::{header_checksum, Descriptor, MAGIC};
use crate::frame::stash::Stash;
use crate::level::Level;
use crate::pool::BufferPool;

enum WriteState {
    Created,
    Open,
    Closed,
}

pub struct FrameWriter {
    state: WriteState,
    descriptor: Descriptor,
    level: Level,
    encoder: Option<Box<dyn BlockEncoder>>,
    stash: Stash,
    buffer: Vec<u8>,
    pending_body: usize,
    bytes_written: u64,
}

impl FrameWriter {
    pub fn new(descriptor: Descriptor, level: Level) -> Result<FrameWriter, Lz4Error> {
        if descriptor.block_checksum || descriptor.content_checksum {
            return Err(Lz4Error::UnsupportedFeature("writing checksummed frames"));
        }
        if descriptor.dictionary_id.is_some() {
            return Err(Lz4Error::UnsupportedFeature("writing dictionary frames"));
        }
        Ok(FrameWriter {
            state: WriteState::Created,
            descriptor,
            level,
            encoder: None,
            stash: Stash::new(),
            buffer: Vec::new(),
            pending_body: 0,
            bytes_written: 0,
        })
    }

    /// Stage the frame header. Returns `true` the first time (header bytes
    /// are now pending), `false` if the frame is already open.
    pub fn open(&mut self) -> Result<bool, Lz4Error> {
        match self.state {
            WriteState::Open => return Ok(false),
            WriteState::Closed => return Err(Lz4Error::Closed),
            WriteState::Created => {}
        }
        self.stash.poke4(MAGIC);
        let mark = self.stash.len();
        self.stash.poke1(self.descriptor.flg_byte());
        self.stash.poke1(self.descriptor.bd_byte());
        if let Some(length) = self.descriptor.content_length {
            self.stash.poke8(length);
        }
        let digest = header_checksum(&self.stash.as_slice()[mark..]);
        self.stash.poke1(digest);

        let block_size = self.descriptor.block_size.bytes();
        self.encoder = Some(new_encoder(
            self.descriptor.chaining,
            self.level,
            block_size,
            0,
        ));
        self.buffer = BufferPool::global().alloc(compress_bound(block_size));
        self.state = WriteState::Open;
        Ok(true)
    }

    /// Feed plain bytes. Returns how many were consumed; stops early when a
    /// block fills and gets staged, so callers loop, flushing between calls.
    pub fn write(&mut self, src: &[u8]) -> Result<usize, Lz4Error> {
        if !matches!(self.state, WriteState::Open) {
            return Err(Lz4Error::Closed);
        }
        debug_assert!(!self.has_pending());
        if src.is_empty() {
            return Ok(0);
        }
        let encoder = self.encoder.as_mut().ok_or(Lz4Error::Closed)?;
        let (consumed, block) = encoder.topup_and_encode(src, &mut self.buffer, false, true)?;
        self.stage_block(block);
        self.bytes_written += consumed as u64;
        Ok(consumed)
    }

    /// One step of frame finalization: flushes the last partial block, then
    /// the terminator. Returns `false` once there is nothing left to stage.
    pub fn finish_step(&mut self) -> Result<bool, Lz4Error> {
        match self.state {
            WriteState::Created => return Err(Lz4Error::Closed),
            WriteState::Closed => return Ok(false),
            WriteState::Open => {}
        }
        debug_assert!(!self.has_pending());
        let encoder = self.encoder.as_mut().ok_or(Lz4Error::Closed)?;
        if encoder.bytes_ready() > 0 {
            let block = encoder.encode(&mut self.buffer, true)?;
            self.stage_block(block);
            return Ok(true);
        }
        self.stash.poke4(0);
        self.encoder = None;
        let buffer = std::mem::take(&mut self.buffer);
        if buffer.capacity() > 0 {
            BufferPool::global().free(buffer);
        }
        self.state = WriteState::Closed;
        Ok(true)
    }

    fn stage_block(&mut self, block: EncodedBlock) {
        match block {
            EncodedBlock::None => {}
            EncodedBlock::Copied(length) => {
                self.stash.poke4(length as u32 | 0x8000_0000);
                self.pending_body = length;
            }
            EncodedBlock::Encoded(length) => {
                self.stash.poke4(length as u32);
                self.pending_body = length;
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.stash.is_empty() || self.pending_body > 0
    }

    /// Staged bytes, in wire order: head (header or block length) first,
    /// then the block body.
    pub fn pending(&self) -> (&[u8], &[u8]) {
        (self.stash.as_slice(), &self.buffer[..self.pending_body])
    }

    pub fn clear_pending(&mut self) {
        self.stash.clear();
        self.pending_body = 0;
    }

    /// Total plain bytes accepted over the frame's lifetime.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, WriteState::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::descriptor::BlockSize;
    use crate::frame::reader::{FrameReader, ReadStep};

    fn collect(writer: &mut FrameWriter, payload: &[u8]) -> Vec<u8> {
        let mut wire = Vec::new();
        let mut flush = |w: &mut FrameWriter| {
            let (head, body) = w.pending();
            wire.extend_from_slice(head);
            wire.extend_from_slice(body);
            w.clear_pending();
        };
        writer.open().unwrap();
        flush(writer);
        let mut done = 0;
        while done < payload.len() {
            done += writer.write(&payload[done..]).unwrap();
            flush(writer);
        }
        while writer.finish_step().unwrap() {
            flush(writer);
        }
        wire
    }

    fn decode(wire: &[u8]) -> Vec<u8> {
        let mut reader = FrameReader::new();
        let mut pos = 0;
        let mut out = Vec::new();
        let mut scratch = [0u8; 4096];
        loop {
            match reader.step().unwrap() {
                ReadStep::Fill { length, optional } => {
                    if pos == wire.len() && optional {
                        reader.filled(0).unwrap();
                        continue;
                    }
                    reader
                        .fill_buf(length)
                        .copy_from_slice(&wire[pos..pos + length]);
                    pos += length;
                    reader.filled(length).unwrap();
                }
                ReadStep::Data { .. } => {
                    let n = reader.drain(&mut scratch).unwrap();
                    out.extend_from_slice(&scratch[..n]);
                }
                ReadStep::FrameEnd => continue,
                ReadStep::Eof => return out,
            }
        }
    }

    #[test]
    fn empty_frame_is_header_and_terminator() {
        let mut writer = FrameWriter::new(Descriptor::default(), Level::Fast).unwrap();
        let wire = collect(&mut writer, b"");
        // magic + FLG/BD + HC + zero terminator
        assert_eq!(wire.len(), 4 + 2 + 1 + 4);
        assert_eq!(decode(&wire), Vec::<u8>::new());
    }

    #[test]
    fn roundtrip_through_reader() {
        let payload: Vec<u8> = (0..200_000u32)
            .map(|i| (i % 251) as u8 ^ (i / 997) as u8)
            .collect();
        let mut writer = FrameWriter::new(Descriptor::default(), Level::Fast).unwrap();
        let wire = collect(&mut writer, &payload);
        assert_eq!(writer.bytes_written(), payload.len() as u64);
        assert_eq!(decode(&wire), payload);
    }

    #[test]
    fn declared_content_length_is_visible_to_reader() {
        let descriptor = Descriptor {
            content_length: Some(6),
            ..Descriptor::default()
        };
        let mut writer = FrameWriter::new(descriptor, Level::Fast).unwrap();
        let wire = collect(&mut writer, b"hello\n");

        let mut reader = FrameReader::new();
        let mut pos = 0;
        loop {
            match reader.step().unwrap() {
                ReadStep::Fill { length, .. } => {
                    reader
                        .fill_buf(length)
                        .copy_from_slice(&wire[pos..pos + length]);
                    pos += length;
                    reader.filled(length).unwrap();
                    if reader.is_open() {
                        break;
                    }
                }
                _ => unreachable!(),
            }
        }
        assert_eq!(reader.frame_length(), Some(6));
    }

    #[test]
    fn independent_blocks_roundtrip() {
        let descriptor = Descriptor {
            chaining: false,
            block_size: BlockSize::Max64Kb,
            ..Descriptor::default()
        };
        let payload = b"line of text\n".repeat(40_000);
        let mut writer = FrameWriter::new(descriptor, Level::Hc6).unwrap();
        let wire = collect(&mut writer, &payload);
        assert_eq!(decode(&wire), payload);
    }

    #[test]
    fn checksum_descriptors_are_rejected() {
        let descriptor = Descriptor {
            content_checksum: true,
            ..Descriptor::default()
        };
        assert!(matches!(
            FrameWriter::new(descriptor, Level::Fast),
            Err(Lz4Error::UnsupportedFeature(_))
        ));
    }
}
