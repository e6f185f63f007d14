//! lz4flow — LZ4 block and frame codec with streaming sessions.
//!
//! Layered bottom-up: `block` and `hc` implement the LZ4 block format
//! (greedy, hash-chain and optimal-parse compressors, safe decompressor);
//! `engine` adds the sliding-window block encoders/decoders used by
//! chained frames; `frame` speaks the LZ4 Frame wire grammar through
//! transport-free state machines; `io` drives those over slices, blocking
//! streams and (feature `async`) tokio streams; `pickle` is the
//! frame-less single-shot helper.

pub mod block;
pub mod codec;
pub mod engine;
pub mod error;
pub mod frame;
pub mod hc;
pub mod io;
pub mod level;
pub mod pickle;
pub mod pool;
pub mod xxhash;

pub use block::compress_bound;
pub use codec::{decode_block, encode_block};
pub use error::{ChecksumKind, Lz4Error};
pub use frame::{BlockSize, Descriptor};
pub use io::{frame_compress, frame_compress_with, frame_decompress};
pub use level::Level;
pub use pickle::{pickle, unpickle, unpickled_size};
