//! Frame decoding session, transport-free.
//!
//! [`FrameReader`] is a state machine that never touches a byte source:
//! [`FrameReader::step`] says what it needs next (fill N bytes, data is
//! ready to drain, frame ended, clean end of stream), the driver moves the
//! bytes, [`FrameReader::filled`] advances the parse. The same core backs
//! the blocking and async sessions, slices and anything else that can move
//! bytes.
//!
//! A fill marked `optional` may be answered with zero bytes to signal a
//! clean end of stream; it is only issued where a frame boundary makes
//! that legal. Anywhere else the driver reports a short read as
//! [`Lz4Error::Truncated`]. Any error poisons the session.

use crate::engine::{new_decoder, BlockDecoder};
use crate::error::{ChecksumKind, Lz4Error};
use crate::frame::descriptor::{header_checksum, BlockSize, Descriptor, MAGIC};
use crate::frame::stash::Stash;
use crate::pool::BufferPool;
use crate::xxhash::{xxh32_oneshot, Xxh32State};

/// What the reader needs or offers next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStep {
    /// Fill exactly `length` bytes into [`FrameReader::fill_buf`], then
    /// call [`FrameReader::filled`]. `optional` fills accept `filled(0)`
    /// for a clean end of stream.
    Fill { length: usize, optional: bool },
    /// Decoded bytes are waiting in [`FrameReader::drain`].
    Data { available: usize },
    /// The frame terminator (and content checksum, if any) was consumed.
    FrameEnd,
    /// Clean end of stream at a frame boundary.
    Eof,
}

enum ReadState {
    Magic,
    FlagBytes,
    ContentLength,
    DictionaryId,
    HeaderChecksum,
    BlockLength,
    BlockData { length: usize, compressed: bool },
    BlockChecksum { length: usize, compressed: bool },
    ContentChecksum,
    Finished,
    Eof,
    Poisoned,
}

pub struct FrameReader {
    state: ReadState,
    stash: Stash,
    // Header fields under construction.
    flg: u8,
    bd: u8,
    content_length: Option<u64>,
    dictionary_id: Option<u32>,

    descriptor: Option<Descriptor>,
    decoder: Option<Box<dyn BlockDecoder>>,
    buffer: Vec<u8>,
    available: usize,
    content_hash: Option<Xxh32State>,
    frame_produced: u64,
    bytes_read: u64,
}

impl FrameReader {
    pub fn new() -> FrameReader {
        FrameReader {
            state: ReadState::Magic,
            stash: Stash::new(),
            flg: 0,
            bd: 0,
            content_length: None,
            dictionary_id: None,
            descriptor: None,
            decoder: None,
            buffer: Vec::new(),
            available: 0,
            content_hash: None,
            frame_produced: 0,
            bytes_read: 0,
        }
    }

    /// Advance: report the next thing the driver must do.
    pub fn step(&mut self) -> Result<ReadStep, Lz4Error> {
        if self.available > 0 {
            return Ok(ReadStep::Data {
                available: self.available,
            });
        }
        let step = match self.state {
            ReadState::Magic => ReadStep::Fill {
                length: 4,
                optional: true,
            },
            ReadState::FlagBytes => ReadStep::Fill {
                length: 2,
                optional: false,
            },
            ReadState::ContentLength => ReadStep::Fill {
                length: 8,
                optional: false,
            },
            ReadState::DictionaryId | ReadState::BlockLength => ReadStep::Fill {
                length: 4,
                optional: false,
            },
            ReadState::HeaderChecksum => ReadStep::Fill {
                length: 1,
                optional: false,
            },
            ReadState::BlockData { length, .. } => ReadStep::Fill {
                length,
                optional: false,
            },
            ReadState::BlockChecksum { .. } | ReadState::ContentChecksum => ReadStep::Fill {
                length: 4,
                optional: false,
            },
            ReadState::Finished => {
                self.state = ReadState::Magic;
                ReadStep::FrameEnd
            }
            ReadState::Eof => ReadStep::Eof,
            ReadState::Poisoned => return Err(Lz4Error::Closed),
        };
        Ok(step)
    }

    /// Where the next fill lands: block payloads go to the staging buffer,
    /// everything else to the stash.
    pub fn fill_buf(&mut self, length: usize) -> &mut [u8] {
        match self.state {
            ReadState::BlockData { .. } => &mut self.buffer[..length],
            _ => self.stash.space(length),
        }
    }

    /// Commit a fill. `length` must equal the requested length, or 0 for
    /// an optional fill that hit a clean end of stream.
    pub fn filled(&mut self, length: usize) -> Result<(), Lz4Error> {
        let result = self.advance(length);
        if result.is_err() {
            self.state = ReadState::Poisoned;
        }
        result
    }

    fn advance(&mut self, length: usize) -> Result<(), Lz4Error> {
        match self.state {
            ReadState::Magic => {
                if length == 0 {
                    self.state = ReadState::Eof;
                    return Ok(());
                }
                self.stash.advance(4);
                if self.stash.last4() != MAGIC {
                    return Err(Lz4Error::MagicExpected);
                }
                self.stash.clear();
                self.content_length = None;
                self.dictionary_id = None;
                self.state = ReadState::FlagBytes;
            }
            ReadState::FlagBytes => {
                self.stash.advance(2);
                let s = self.stash.as_slice();
                self.flg = s[s.len() - 2];
                self.bd = s[s.len() - 1];
                let version = (self.flg >> 6) & 0b11;
                if version != 1 {
                    return Err(Lz4Error::UnknownFrameVersion(version));
                }
                // Reserved BD codes are diagnosed after the header checksum,
                // so a flipped bit reports corruption rather than misparse.
                self.state = if self.flg & 0b1000 != 0 {
                    ReadState::ContentLength
                } else if self.flg & 1 != 0 {
                    ReadState::DictionaryId
                } else {
                    ReadState::HeaderChecksum
                };
            }
            ReadState::ContentLength => {
                self.stash.advance(8);
                self.content_length = Some(self.stash.last8());
                self.state = if self.flg & 1 != 0 {
                    ReadState::DictionaryId
                } else {
                    ReadState::HeaderChecksum
                };
            }
            ReadState::DictionaryId => {
                self.stash.advance(4);
                self.dictionary_id = Some(self.stash.last4());
                self.state = ReadState::HeaderChecksum;
            }
            ReadState::HeaderChecksum => {
                // The digest covers the descriptor bytes already stashed,
                // not the checksum byte itself.
                let actual = header_checksum(self.stash.as_slice());
                self.stash.advance(1);
                if self.stash.last1() != actual {
                    return Err(Lz4Error::InvalidChecksum(ChecksumKind::Header));
                }
                if self.dictionary_id.is_some() {
                    return Err(Lz4Error::UnsupportedFeature("predefined dictionaries"));
                }
                self.open_frame()?;
                self.stash.clear();
                self.state = ReadState::BlockLength;
            }
            ReadState::BlockLength => {
                self.stash.advance(4);
                let raw = self.stash.last4();
                self.stash.clear();
                if raw == 0 {
                    if self.content_hash.is_some() {
                        self.state = ReadState::ContentChecksum;
                    } else {
                        self.check_content_length()?;
                        self.close_frame();
                        self.state = ReadState::Finished;
                    }
                } else {
                    let compressed = raw & 0x8000_0000 == 0;
                    let length = (raw & 0x7FFF_FFFF) as usize;
                    if length == 0 || length > self.buffer.len() {
                        return Err(Lz4Error::MalformedStream("block length out of range"));
                    }
                    self.state = ReadState::BlockData { length, compressed };
                }
            }
            ReadState::BlockData { length, compressed } => {
                if self
                    .descriptor
                    .as_ref()
                    .map(|d| d.block_checksum)
                    .unwrap_or(false)
                {
                    self.state = ReadState::BlockChecksum { length, compressed };
                } else {
                    self.ingest_block(length, compressed)?;
                }
            }
            ReadState::BlockChecksum { length, compressed } => {
                self.stash.advance(4);
                let declared = self.stash.last4();
                self.stash.clear();
                if xxh32_oneshot(&self.buffer[..length], 0) != declared {
                    return Err(Lz4Error::InvalidChecksum(ChecksumKind::Block));
                }
                self.ingest_block(length, compressed)?;
            }
            ReadState::ContentChecksum => {
                self.stash.advance(4);
                let declared = self.stash.last4();
                self.stash.clear();
                let computed = self
                    .content_hash
                    .take()
                    .map(|h| h.digest())
                    .ok_or(Lz4Error::Closed)?;
                if computed != declared {
                    return Err(Lz4Error::InvalidChecksum(ChecksumKind::Content));
                }
                self.check_content_length()?;
                self.close_frame();
                self.state = ReadState::Finished;
            }
            ReadState::Finished | ReadState::Eof | ReadState::Poisoned => {
                return Err(Lz4Error::Closed);
            }
        }
        Ok(())
    }

    fn open_frame(&mut self) -> Result<(), Lz4Error> {
        let block_size = BlockSize::from_code((self.bd >> 4) & 0b111)
            .ok_or(Lz4Error::MalformedStream("reserved block-size code"))?;
        let descriptor = Descriptor {
            content_length: self.content_length,
            content_checksum: self.flg & 0b100 != 0,
            chaining: self.flg & 0b10_0000 == 0,
            block_checksum: self.flg & 0b1_0000 != 0,
            dictionary_id: None,
            block_size,
        };
        self.decoder = Some(new_decoder(descriptor.chaining, block_size.bytes()));
        self.buffer = BufferPool::global().alloc(block_size.bytes());
        self.content_hash = descriptor.content_checksum.then(|| Xxh32State::new(0));
        self.frame_produced = 0;
        self.descriptor = Some(descriptor);
        Ok(())
    }

    fn ingest_block(&mut self, length: usize, compressed: bool) -> Result<(), Lz4Error> {
        let decoder = self.decoder.as_mut().ok_or(Lz4Error::Closed)?;
        let produced = if compressed {
            // The output bound here is the header's block size, not a
            // caller-supplied buffer; overflowing it is stream corruption,
            // not a recoverable sizing problem.
            decoder.decode(&self.buffer[..length]).map_err(|err| match err {
                Lz4Error::OutputTooSmall => {
                    Lz4Error::MalformedStream("block expands past the declared block size")
                }
                other => other,
            })?
        } else {
            decoder.inject(&self.buffer[..length])?
        };
        if let Some(hash) = self.content_hash.as_mut() {
            if compressed {
                hash.update(decoder.peek(-(produced as isize), produced)?);
            } else {
                hash.update(&self.buffer[..length]);
            }
        }
        self.available = produced;
        self.frame_produced += produced as u64;
        self.state = ReadState::BlockLength;
        Ok(())
    }

    fn check_content_length(&self) -> Result<(), Lz4Error> {
        match self.frame_length() {
            Some(declared) if declared != self.frame_produced => {
                Err(Lz4Error::MalformedStream("content length mismatch"))
            }
            _ => Ok(()),
        }
    }

    fn close_frame(&mut self) {
        self.decoder = None;
        self.content_hash = None;
        let buffer = std::mem::take(&mut self.buffer);
        if buffer.capacity() > 0 {
            BufferPool::global().free(buffer);
        }
    }

    /// Copy decoded bytes out, oldest first. Returns how many were copied.
    pub fn drain(&mut self, dst: &mut [u8]) -> Result<usize, Lz4Error> {
        let n = dst.len().min(self.available);
        if n == 0 {
            return Ok(0);
        }
        let decoder = self.decoder.as_mut().ok_or(Lz4Error::Closed)?;
        decoder.drain(&mut dst[..n], -(self.available as isize))?;
        self.available -= n;
        self.bytes_read += n as u64;
        Ok(n)
    }

    /// Header seen and the frame not yet finished.
    pub fn is_open(&self) -> bool {
        self.decoder.is_some()
    }

    /// Descriptor of the current (or last fully opened) frame.
    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_ref()
    }

    /// Declared content length of the current frame, if the producer
    /// recorded one. Checked against the bytes actually produced when the
    /// frame terminator is reached.
    pub fn frame_length(&self) -> Option<u64> {
        self.descriptor.as_ref().and_then(|d| d.content_length)
    }

    /// Total plain bytes drained over the session's lifetime.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Release resources; further use fails with [`Lz4Error::Closed`].
    pub fn close(&mut self) {
        self.close_frame();
        self.available = 0;
        self.state = ReadState::Eof;
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        FrameReader::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal driver over a byte slice.
    fn run(reader: &mut FrameReader, src: &[u8]) -> Result<Vec<u8>, Lz4Error> {
        let mut pos = 0usize;
        let mut out = Vec::new();
        let mut scratch = [0u8; 4096];
        loop {
            match reader.step()? {
                ReadStep::Fill { length, optional } => {
                    if pos + length > src.len() {
                        if optional && pos == src.len() {
                            reader.filled(0)?;
                            continue;
                        }
                        return Err(Lz4Error::Truncated);
                    }
                    reader.fill_buf(length).copy_from_slice(&src[pos..pos + length]);
                    pos += length;
                    reader.filled(length)?;
                }
                ReadStep::Data { .. } => {
                    let n = reader.drain(&mut scratch)?;
                    out.extend_from_slice(&scratch[..n]);
                }
                ReadStep::FrameEnd => continue,
                ReadStep::Eof => return Ok(out),
            }
        }
    }

    fn tiny_frame(payload_block: &[u8], stored: bool) -> Vec<u8> {
        // Hand-built chained frame, 64 KiB blocks, no checksums.
        let mut frame = Vec::new();
        frame.extend_from_slice(&MAGIC.to_le_bytes());
        let desc = [0b0100_0000u8, 0x40];
        frame.extend_from_slice(&desc);
        frame.push(header_checksum(&desc));
        let mut len = payload_block.len() as u32;
        if stored {
            len |= 0x8000_0000;
        }
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(payload_block);
        frame.extend_from_slice(&0u32.to_le_bytes());
        frame
    }

    #[test]
    fn empty_frame_yields_nothing() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&MAGIC.to_le_bytes());
        let desc = [0b0100_0000u8, 0x40];
        frame.extend_from_slice(&desc);
        frame.push(header_checksum(&desc));
        frame.extend_from_slice(&0u32.to_le_bytes());

        let mut reader = FrameReader::new();
        assert_eq!(run(&mut reader, &frame).unwrap(), Vec::<u8>::new());
        assert_eq!(reader.bytes_read(), 0);
    }

    #[test]
    fn stored_block_passes_through() {
        let frame = tiny_frame(b"raw bytes, stored verbatim", true);
        let mut reader = FrameReader::new();
        assert_eq!(
            run(&mut reader, &frame).unwrap(),
            b"raw bytes, stored verbatim"
        );
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut reader = FrameReader::new();
        let err = run(&mut reader, b"not an lz4 frame").unwrap_err();
        assert!(matches!(err, Lz4Error::MagicExpected));
        // Poisoned from here on.
        assert!(matches!(reader.step(), Err(Lz4Error::Closed)));
    }

    #[test]
    fn corrupted_header_checksum_is_rejected() {
        let mut frame = tiny_frame(b"irrelevant", true);
        frame[6] ^= 0xFF; // the HC byte
        let mut reader = FrameReader::new();
        assert!(matches!(
            run(&mut reader, &frame).unwrap_err(),
            Lz4Error::InvalidChecksum(ChecksumKind::Header)
        ));
    }

    #[test]
    fn dictionary_id_is_unsupported() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&MAGIC.to_le_bytes());
        let desc = [0b0100_0001u8, 0x40, 0xEF, 0xBE, 0xAD, 0xDE];
        frame.extend_from_slice(&desc);
        frame.push(header_checksum(&desc));
        let mut reader = FrameReader::new();
        assert!(matches!(
            run(&mut reader, &frame).unwrap_err(),
            Lz4Error::UnsupportedFeature(_)
        ));
    }

    #[test]
    fn missing_terminator_is_truncated() {
        let mut frame = tiny_frame(b"short", true);
        frame.truncate(frame.len() - 4);
        let mut reader = FrameReader::new();
        assert!(matches!(
            run(&mut reader, &frame).unwrap_err(),
            Lz4Error::Truncated
        ));
    }

    #[test]
    fn oversized_block_length_is_malformed() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&MAGIC.to_le_bytes());
        let desc = [0b0100_0000u8, 0x40];
        frame.extend_from_slice(&desc);
        frame.push(header_checksum(&desc));
        frame.extend_from_slice(&(0x7FFF_FFFFu32).to_le_bytes());
        let mut reader = FrameReader::new();
        assert!(matches!(
            run(&mut reader, &frame).unwrap_err(),
            Lz4Error::MalformedStream(_)
        ));
    }

    #[test]
    fn block_expanding_past_block_size_is_malformed() {
        use crate::block::compress_bound;
        use crate::codec::encode_block;
        use crate::level::Level;

        // 70 000 plain bytes cannot fit the 64 KiB block size the header
        // declares; the decoder must report corruption, not a retryable
        // buffer problem.
        let payload = vec![0u8; 70_000];
        let mut packed = vec![0u8; compress_bound(payload.len())];
        let n = encode_block(&payload, &mut packed, Level::Fast).unwrap();
        let frame = tiny_frame(&packed[..n], false);
        let mut reader = FrameReader::new();
        assert!(matches!(
            run(&mut reader, &frame).unwrap_err(),
            Lz4Error::MalformedStream(_)
        ));
    }

    #[test]
    fn lying_content_length_is_malformed() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&MAGIC.to_le_bytes());
        let mut desc = vec![0b0100_1000u8, 0x40];
        desc.extend_from_slice(&5u64.to_le_bytes());
        frame.extend_from_slice(&desc);
        frame.push(header_checksum(&desc));
        frame.extend_from_slice(&(3u32 | 0x8000_0000).to_le_bytes());
        frame.extend_from_slice(b"abc");
        frame.extend_from_slice(&0u32.to_le_bytes());

        let mut reader = FrameReader::new();
        assert!(matches!(
            run(&mut reader, &frame).unwrap_err(),
            Lz4Error::MalformedStream("content length mismatch")
        ));
    }

    #[test]
    fn concatenated_frames_drain_in_order() {
        let mut stream = tiny_frame(b"first frame ", true);
        stream.extend_from_slice(&tiny_frame(b"second frame", true));
        let mut reader = FrameReader::new();
        assert_eq!(run(&mut reader, &stream).unwrap(), b"first frame second frame");
        assert_eq!(reader.bytes_read(), 24);
    }
}
