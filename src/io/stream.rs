//! Blocking drivers over `std::io::Read` / `std::io::Write`.
//!
//! Two surfaces per direction:
//!
//! - [`FrameReadSession`] / [`FrameWriteSession`] — explicit, fallible with
//!   [`Lz4Error`], frame-aware (`open`, `frame_length`, `finish`).
//! - [`FrameReadStream`] / [`FrameWriteStream`] — thin `io::Read` /
//!   `io::Write` facades over the sessions for code that only speaks the
//!   std traits. The read facade concatenates back-to-back frames.

use std::io::{self, Read, Write};

use crate::error::Lz4Error;
use crate::frame::descriptor::Descriptor;
use crate::frame::reader::{FrameReader, ReadStep};
use crate::frame::writer::FrameWriter;
use crate::level::Level;

// ── Reading ──────────────────────────────────────────────────────────────────

pub struct FrameReadSession<R: Read> {
    core: FrameReader,
    inner: R,
}

impl<R: Read> FrameReadSession<R> {
    pub fn new(inner: R) -> FrameReadSession<R> {
        FrameReadSession {
            core: FrameReader::new(),
            inner,
        }
    }

    fn fill(&mut self, length: usize, optional: bool) -> Result<(), Lz4Error> {
        let buf = self.core.fill_buf(length);
        let mut done = 0;
        while done < length {
            let n = self.inner.read(&mut buf[done..length]).map_err(Lz4Error::Io)?;
            if n == 0 {
                if done == 0 && optional {
                    return self.core.filled(0);
                }
                return Err(Lz4Error::Truncated);
            }
            done += n;
        }
        self.core.filled(length)
    }

    /// Parse the frame header if one is present. Returns `false` on a clean
    /// end of stream, `true` once a frame is open.
    pub fn open(&mut self) -> Result<bool, Lz4Error> {
        loop {
            if self.core.is_open() {
                return Ok(true);
            }
            match self.core.step()? {
                ReadStep::Fill { length, optional } => self.fill(length, optional)?,
                ReadStep::Eof => return Ok(false),
                // Decoded data still buffered, or a terminator straddling
                // two frames; either way a frame is or was open.
                ReadStep::Data { .. } | ReadStep::FrameEnd => return Ok(true),
            }
        }
    }

    /// Read decoded bytes. Returns 0 only at the end of the stream.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize, Lz4Error> {
        let mut done = 0;
        while done < dst.len() {
            match self.core.step()? {
                ReadStep::Data { .. } => done += self.core.drain(&mut dst[done..])?,
                ReadStep::Fill { length, optional } => self.fill(length, optional)?,
                ReadStep::FrameEnd => continue,
                ReadStep::Eof => break,
            }
        }
        Ok(done)
    }

    /// Like [`read`](Self::read), but returns as soon as at least one byte
    /// is available, without waiting for `dst` to fill.
    pub fn read_some(&mut self, dst: &mut [u8]) -> Result<usize, Lz4Error> {
        if dst.is_empty() {
            return Ok(0);
        }
        loop {
            match self.core.step()? {
                ReadStep::Data { .. } => return self.core.drain(dst),
                ReadStep::Fill { length, optional } => self.fill(length, optional)?,
                ReadStep::FrameEnd => continue,
                ReadStep::Eof => return Ok(0),
            }
        }
    }

    /// Next decoded byte, or `None` at the end of the stream.
    pub fn read_u8(&mut self) -> Result<Option<u8>, Lz4Error> {
        let mut byte = [0u8; 1];
        match self.read_some(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    /// Declared content length of the current frame, opening it if needed.
    pub fn frame_length(&mut self) -> Result<Option<u64>, Lz4Error> {
        self.open()?;
        Ok(self.core.frame_length())
    }

    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.core.descriptor()
    }

    pub fn bytes_read(&self) -> u64 {
        self.core.bytes_read()
    }

    pub fn into_inner(mut self) -> R {
        self.core.close();
        self.inner
    }
}

/// `io::Read` facade; concatenated frames decode as one stream.
pub struct FrameReadStream<R: Read> {
    session: FrameReadSession<R>,
}

impl<R: Read> FrameReadStream<R> {
    pub fn new(inner: R) -> FrameReadStream<R> {
        FrameReadStream {
            session: FrameReadSession::new(inner),
        }
    }

    pub fn frame_length(&mut self) -> Result<Option<u64>, Lz4Error> {
        self.session.frame_length()
    }

    pub fn into_inner(self) -> R {
        self.session.into_inner()
    }
}

impl<R: Read> Read for FrameReadStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.session.read_some(buf).map_err(io::Error::from)
    }
}

// ── Writing ──────────────────────────────────────────────────────────────────

pub struct FrameWriteSession<W: Write> {
    core: FrameWriter,
    inner: W,
}

impl<W: Write> FrameWriteSession<W> {
    pub fn new(inner: W, descriptor: Descriptor, level: Level) -> Result<FrameWriteSession<W>, Lz4Error> {
        Ok(FrameWriteSession {
            core: FrameWriter::new(descriptor, level)?,
            inner,
        })
    }

    fn flush_pending(&mut self) -> Result<(), Lz4Error> {
        let (head, body) = self.core.pending();
        self.inner.write_all(head).map_err(Lz4Error::Io)?;
        self.inner.write_all(body).map_err(Lz4Error::Io)?;
        self.core.clear_pending();
        Ok(())
    }

    fn ensure_open(&mut self) -> Result<(), Lz4Error> {
        if self.core.open()? {
            self.flush_pending()?;
        }
        Ok(())
    }

    /// Encode and write `src` in full.
    pub fn write(&mut self, src: &[u8]) -> Result<(), Lz4Error> {
        self.ensure_open()?;
        let mut done = 0;
        while done < src.len() {
            done += self.core.write(&src[done..])?;
            if self.core.has_pending() {
                self.flush_pending()?;
            }
        }
        Ok(())
    }

    pub fn write_u8(&mut self, byte: u8) -> Result<(), Lz4Error> {
        self.write(&[byte])
    }

    /// Flush the last partial block and the frame terminator. Idempotent.
    pub fn finish(&mut self) -> Result<(), Lz4Error> {
        if self.core.is_closed() {
            return Ok(());
        }
        self.ensure_open()?;
        while self.core.finish_step()? {
            self.flush_pending()?;
        }
        self.inner.flush().map_err(Lz4Error::Io)
    }

    pub fn bytes_written(&self) -> u64 {
        self.core.bytes_written()
    }

    /// Finish the frame and hand back the sink.
    pub fn into_inner(mut self) -> Result<W, Lz4Error> {
        self.finish()?;
        Ok(self.inner)
    }
}

/// `io::Write` facade. The frame terminator is written by [`finish`]
/// (called from `Drop` as a last resort, errors discarded there).
pub struct FrameWriteStream<W: Write> {
    session: Option<FrameWriteSession<W>>,
}

impl<W: Write> FrameWriteStream<W> {
    pub fn new(inner: W, descriptor: Descriptor, level: Level) -> Result<FrameWriteStream<W>, Lz4Error> {
        Ok(FrameWriteStream {
            session: Some(FrameWriteSession::new(inner, descriptor, level)?),
        })
    }

    pub fn finish(mut self) -> Result<W, Lz4Error> {
        match self.session.take() {
            Some(session) => session.into_inner(),
            None => Err(Lz4Error::Closed),
        }
    }

    fn session(&mut self) -> io::Result<&mut FrameWriteSession<W>> {
        self.session
            .as_mut()
            .ok_or_else(|| io::Error::from(Lz4Error::Closed))
    }
}

impl<W: Write> Write for FrameWriteStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.session()?.write(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.session.as_mut() {
            Some(session) => {
                session.ensure_open()?;
                session.inner.flush()
            }
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for FrameWriteStream<W> {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            let _ = session.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_roundtrip_over_vec() {
        let payload = b"the quick brown fox jumps over the lazy dog\n".repeat(3000);
        let mut session =
            FrameWriteSession::new(Vec::new(), Descriptor::default(), Level::Fast).unwrap();
        session.write(&payload).unwrap();
        let wire = session.into_inner().unwrap();
        assert!(wire.len() < payload.len() / 2);

        let mut reader = FrameReadSession::new(wire.as_slice());
        assert!(reader.open().unwrap());
        let mut out = vec![0u8; payload.len() + 1];
        let n = reader.read(&mut out).unwrap();
        assert_eq!(&out[..n], payload.as_slice());
    }

    #[test]
    fn std_trait_facades_compose() {
        let payload = b"abcdefgh".repeat(10_000);
        let mut writer =
            FrameWriteStream::new(Vec::new(), Descriptor::default(), Level::Hc9).unwrap();
        writer.write_all(&payload).unwrap();
        let wire = writer.finish().unwrap();

        let mut out = Vec::new();
        FrameReadStream::new(wire.as_slice())
            .read_to_end(&mut out)
            .unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn open_reports_clean_eof() {
        let mut reader = FrameReadSession::new(&b""[..]);
        assert!(!reader.open().unwrap());
    }

    #[test]
    fn read_u8_walks_the_frame() {
        let mut session =
            FrameWriteSession::new(Vec::new(), Descriptor::default(), Level::Fast).unwrap();
        session.write(b"xyz").unwrap();
        let wire = session.into_inner().unwrap();

        let mut reader = FrameReadSession::new(wire.as_slice());
        assert_eq!(reader.read_u8().unwrap(), Some(b'x'));
        assert_eq!(reader.read_u8().unwrap(), Some(b'y'));
        assert_eq!(reader.read_u8().unwrap(), Some(b'z'));
        assert_eq!(reader.read_u8().unwrap(), None);
    }
}
