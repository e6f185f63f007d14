//! LZ4 block format: constants, the fast compressor and the decompressor.

pub mod compress;
pub mod decompress;
pub mod types;

pub use compress::{compress, compress_with_table, FastTable};
pub use decompress::{decompress, decompress_into};
pub use types::compress_bound;
