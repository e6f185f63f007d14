//! Async drivers over tokio's `AsyncRead` / `AsyncWrite`.
//!
//! Same cores as [`crate::io::stream`], same stepping loops; only the byte
//! moves await. Nothing in the codec itself is async, so the sync and
//! async paths cannot drift apart.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Lz4Error;
use crate::frame::descriptor::Descriptor;
use crate::frame::reader::{FrameReader, ReadStep};
use crate::frame::writer::FrameWriter;
use crate::level::Level;

pub struct AsyncFrameReader<R: AsyncRead + Unpin> {
    core: FrameReader,
    inner: R,
}

impl<R: AsyncRead + Unpin> AsyncFrameReader<R> {
    pub fn new(inner: R) -> AsyncFrameReader<R> {
        AsyncFrameReader {
            core: FrameReader::new(),
            inner,
        }
    }

    async fn fill(&mut self, length: usize, optional: bool) -> Result<(), Lz4Error> {
        let buf = self.core.fill_buf(length);
        let mut done = 0;
        while done < length {
            let n = self
                .inner
                .read(&mut buf[done..length])
                .await
                .map_err(Lz4Error::Io)?;
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

    pub async fn open(&mut self) -> Result<bool, Lz4Error> {
        loop {
            if self.core.is_open() {
                return Ok(true);
            }
            match self.core.step()? {
                ReadStep::Fill { length, optional } => self.fill(length, optional).await?,
                ReadStep::Eof => return Ok(false),
                ReadStep::Data { .. } | ReadStep::FrameEnd => return Ok(true),
            }
        }
    }

    /// Read decoded bytes. Returns 0 only at the end of the stream.
    pub async fn read(&mut self, dst: &mut [u8]) -> Result<usize, Lz4Error> {
        let mut done = 0;
        while done < dst.len() {
            match self.core.step()? {
                ReadStep::Data { .. } => done += self.core.drain(&mut dst[done..])?,
                ReadStep::Fill { length, optional } => self.fill(length, optional).await?,
                ReadStep::FrameEnd => continue,
                ReadStep::Eof => break,
            }
        }
        Ok(done)
    }

    /// Returns as soon as at least one byte is available.
    pub async fn read_some(&mut self, dst: &mut [u8]) -> Result<usize, Lz4Error> {
        if dst.is_empty() {
            return Ok(0);
        }
        loop {
            match self.core.step()? {
                ReadStep::Data { .. } => return self.core.drain(dst),
                ReadStep::Fill { length, optional } => self.fill(length, optional).await?,
                ReadStep::FrameEnd => continue,
                ReadStep::Eof => return Ok(0),
            }
        }
    }

    pub async fn frame_length(&mut self) -> Result<Option<u64>, Lz4Error> {
        self.open().await?;
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

pub struct AsyncFrameWriter<W: AsyncWrite + Unpin> {
    core: FrameWriter,
    inner: W,
}

impl<W: AsyncWrite + Unpin> AsyncFrameWriter<W> {
    pub fn new(inner: W, descriptor: Descriptor, level: Level) -> Result<AsyncFrameWriter<W>, Lz4Error> {
        Ok(AsyncFrameWriter {
            core: FrameWriter::new(descriptor, level)?,
            inner,
        })
    }

    async fn flush_pending(&mut self) -> Result<(), Lz4Error> {
        let (head, body) = self.core.pending();
        self.inner.write_all(head).await.map_err(Lz4Error::Io)?;
        self.inner.write_all(body).await.map_err(Lz4Error::Io)?;
        self.core.clear_pending();
        Ok(())
    }

    async fn ensure_open(&mut self) -> Result<(), Lz4Error> {
        if self.core.open()? {
            self.flush_pending().await?;
        }
        Ok(())
    }

    /// Encode and write `src` in full.
    pub async fn write(&mut self, src: &[u8]) -> Result<(), Lz4Error> {
        self.ensure_open().await?;
        let mut done = 0;
        while done < src.len() {
            done += self.core.write(&src[done..])?;
            if self.core.has_pending() {
                self.flush_pending().await?;
            }
        }
        Ok(())
    }

    /// Flush the last partial block and the frame terminator. Idempotent.
    pub async fn finish(&mut self) -> Result<(), Lz4Error> {
        if self.core.is_closed() {
            return Ok(());
        }
        self.ensure_open().await?;
        while self.core.finish_step()? {
            self.flush_pending().await?;
        }
        self.inner.flush().await.map_err(Lz4Error::Io)
    }

    pub fn bytes_written(&self) -> u64 {
        self.core.bytes_written()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
