//! Crate-wide error type.
//!
//! Every fallible operation in this crate returns [`Lz4Error`]. Two variants
//! are recoverable: [`Lz4Error::OutputTooSmall`] (retry with a larger buffer)
//! and [`Lz4Error::Io`] (retry the I/O). All other variants indicate that the
//! input bytes or the session state cannot be trusted any further; streaming
//! sessions poison themselves after raising one.

use std::io;
use thiserror::Error;

/// Which checksum failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumKind {
    /// The one-byte frame-descriptor checksum.
    Header,
    /// A per-block XXH32 checksum.
    Block,
    /// The whole-frame XXH32 content checksum.
    Content,
}

impl std::fmt::Display for ChecksumKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ChecksumKind::Header => "header",
            ChecksumKind::Block => "block",
            ChecksumKind::Content => "content",
        })
    }
}

/// Errors raised by block codecs, frame sessions and picklers.
#[derive(Debug, Error)]
pub enum Lz4Error {
    /// The stream does not start with the LZ4 frame magic number.
    #[error("LZ4 frame magic number expected")]
    MagicExpected,

    /// The frame descriptor carries a version other than 01.
    #[error("LZ4 frame version {0} is not supported")]
    UnknownFrameVersion(u8),

    /// A declared checksum did not match the recomputed value.
    #[error("invalid {0} checksum")]
    InvalidChecksum(ChecksumKind),

    /// The output buffer cannot hold the produced bytes. Recoverable:
    /// retry the same operation with a larger buffer.
    #[error("output buffer too small")]
    OutputTooSmall,

    /// The compressed bytes violate the block or frame format.
    #[error("malformed compressed stream: {0}")]
    MalformedStream(&'static str),

    /// A format feature this implementation does not handle.
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(&'static str),

    /// The underlying source ended in the middle of a frame element.
    /// A clean end exactly at a frame boundary is not an error.
    #[error("unexpected end of stream")]
    Truncated,

    /// The session is closed, or poisoned by an earlier error.
    #[error("session is closed")]
    Closed,

    /// An error from the byte source or sink. Recoverable.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl Lz4Error {
    /// True for errors that leave buffers and sessions in a consistent,
    /// retryable state.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Lz4Error::OutputTooSmall | Lz4Error::Io(_))
    }
}

impl From<Lz4Error> for io::Error {
    fn from(err: Lz4Error) -> io::Error {
        match err {
            Lz4Error::Io(inner) => inner,
            Lz4Error::Truncated => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_classification() {
        assert!(Lz4Error::OutputTooSmall.is_recoverable());
        assert!(Lz4Error::Io(io::Error::new(io::ErrorKind::Other, "x")).is_recoverable());
        assert!(!Lz4Error::MagicExpected.is_recoverable());
        assert!(!Lz4Error::InvalidChecksum(ChecksumKind::Block).is_recoverable());
        assert!(!Lz4Error::Truncated.is_recoverable());
    }

    #[test]
    fn io_error_kinds() {
        let e: io::Error = Lz4Error::Truncated.into();
        assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
        let e: io::Error = Lz4Error::MagicExpected.into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
    }
}
