//! Byte-moving drivers for the frame cores.
//!
//! The frame state machines in [`crate::frame`] never perform I/O; the
//! modules here connect them to concrete transports.

#[cfg(feature = "async")]
pub mod async_io;
pub mod memory;
pub mod stream;

pub use memory::{frame_compress, frame_compress_with, frame_decompress};
pub use stream::{FrameReadSession, FrameReadStream, FrameWriteSession, FrameWriteStream};

#[cfg(feature = "async")]
pub use async_io::{AsyncFrameReader, AsyncFrameWriter};
