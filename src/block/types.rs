//! Block-format constants, hash functions and byte-level helpers shared by
//! the compressors and the decompressor.
//!
//! A compressed block is a run of sequences. Each sequence is a token byte
//! (high nibble: literal length, low nibble: match length minus 4), optional
//! length-extension bytes (255-continuation), the literals, a 2-byte
//! little-endian match offset, and optional match-length extension bytes.
//! A block always ends with a literal-only sequence.

// ─────────────────────────────────────────────────────────────────────────────
// Format constants
// ─────────────────────────────────────────────────────────────────────────────

/// Minimum encodable match length.
pub const MINMATCH: usize = 4;

/// Maximum match offset.
pub const DISTANCE_MAX: usize = 65_535;

/// No match may start within this many bytes of the input end.
pub const MFLIMIT: usize = 12;

/// The final literal run covers at least this many bytes.
pub const LASTLITERALS: usize = 5;

/// Inputs shorter than this are emitted as a single literal run.
pub const MIN_LENGTH: usize = MFLIMIT + 1;

/// Number of token bits devoted to the match length.
pub const ML_BITS: u32 = 4;
/// Saturation value of the token's match-length nibble.
pub const ML_MASK: usize = (1 << ML_BITS) - 1;
/// Saturation value of the token's literal-length nibble.
pub const RUN_MASK: usize = (1 << (8 - ML_BITS)) - 1;

/// Inputs below this size can use 16-bit hash-table entries.
pub const LIMIT_64K: usize = 65_536 + MFLIMIT - 1;

/// Controls how fast the greedy search gives up on incompressible data:
/// the skip stride doubles every `1 << SKIP_TRIGGER` failed probes.
pub const SKIP_TRIGGER: u32 = 6;

// ─────────────────────────────────────────────────────────────────────────────
// Hashing
// ─────────────────────────────────────────────────────────────────────────────

const PRIME32: u32 = 2_654_435_761;
const PRIME40: u64 = 889_523_592_379;

/// Fibonacci hash of a 4-byte sequence into `hash_log` bits.
#[inline]
pub fn hash4(sequence: u32, hash_log: u32) -> usize {
    (sequence.wrapping_mul(PRIME32) >> (32 - hash_log)) as usize
}

/// Hash of the low 5 bytes of an 8-byte sequence into `hash_log` bits.
/// Fewer collisions than [`hash4`] on wide tables.
#[inline]
pub fn hash5(sequence: u64, hash_log: u32) -> usize {
    ((sequence << 24).wrapping_mul(PRIME40) >> (64 - hash_log)) as usize
}

// ─────────────────────────────────────────────────────────────────────────────
// Byte-level helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read 4 bytes at `offset` as a little-endian `u32`.
///
/// # Panics
/// If fewer than 4 bytes remain; callers stay inside the margins the
/// format constants above guarantee.
#[inline]
pub fn read_u32(src: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&src[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

/// Read 8 bytes at `offset` as a little-endian `u64`.
#[inline]
pub fn read_u64(src: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&src[offset..offset + 8]);
    u64::from_le_bytes(bytes)
}

/// Count how many bytes match between `buf[front..]` and `buf[back..]`,
/// stopping when `front` reaches `limit`. Requires `back < front` and
/// `limit <= buf.len()`.
#[inline]
pub fn count_common(buf: &[u8], front: usize, back: usize, limit: usize) -> usize {
    debug_assert!(back < front);
    debug_assert!(limit <= buf.len());
    let mut count = 0;
    // Word-at-a-time main loop; the byte tail handles the remainder.
    while front + count + 8 <= limit {
        let diff = read_u64(buf, front + count) ^ read_u64(buf, back + count);
        if diff != 0 {
            return count + (diff.trailing_zeros() >> 3) as usize;
        }
        count += 8;
    }
    while front + count < limit && buf[front + count] == buf[back + count] {
        count += 1;
    }
    count
}

/// Count how many bytes match walking backwards from `front` and `back`,
/// stopping at `front_floor` / `back_floor`.
#[inline]
pub fn count_back(
    buf: &[u8],
    front: usize,
    back: usize,
    front_floor: usize,
    back_floor: usize,
) -> usize {
    let mut count = 0;
    while front - count > front_floor
        && back - count > back_floor
        && buf[front - count - 1] == buf[back - count - 1]
    {
        count += 1;
    }
    count
}

/// Worst-case compressed size for `length` input bytes. Holds for every
/// level, including stored (incompressible) output.
#[inline]
pub const fn compress_bound(length: usize) -> usize {
    length + length / 255 + 16
}
