//! LZ4 frame format: interoperable container around the block codec.
//!
//! The cores in [`reader`] and [`writer`] are transport-free state
//! machines; the drivers in [`crate::io`] move their bytes over slices,
//! blocking streams and async streams.

pub mod descriptor;
pub mod reader;
mod stash;
pub mod writer;

pub use descriptor::{BlockSize, Descriptor, MAGIC};
pub use reader::{FrameReader, ReadStep};
pub use writer::FrameWriter;
