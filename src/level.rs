//! Compression levels and the per-level search parameters.
//!
//! Level 0 selects the fast greedy engine. Levels 3..=9 select the hash-chain
//! engine with a growing candidate budget. Levels 10..=12 select the optimal
//! parser. Levels 1 and 2 behave like 3 (the hash-chain engine's floor).

/// Compression level, 0 (fast) through 12 (max).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(i32)]
pub enum Level {
    /// Fast greedy engine, acceleration 1.
    Fast = 0,
    Hc3 = 3,
    Hc4 = 4,
    Hc5 = 5,
    Hc6 = 6,
    Hc7 = 7,
    Hc8 = 8,
    Hc9 = 9,
    Opt10 = 10,
    Opt11 = 11,
    /// Optimal parser with an exhaustive candidate budget.
    Max = 12,
}

impl Default for Level {
    fn default() -> Self {
        Level::Fast
    }
}

impl Level {
    /// Clamp an arbitrary integer level to a supported variant. Values
    /// below 3 but above 0 get the cheapest hash-chain level; values above
    /// 12 get [`Level::Max`].
    pub fn from_i32(level: i32) -> Level {
        match level {
            i32::MIN..=0 => Level::Fast,
            1..=3 => Level::Hc3,
            4 => Level::Hc4,
            5 => Level::Hc5,
            6 => Level::Hc6,
            7 => Level::Hc7,
            8 => Level::Hc8,
            9 => Level::Hc9,
            10 => Level::Opt10,
            11 => Level::Opt11,
            _ => Level::Max,
        }
    }

    /// True for levels handled by the hash-chain or optimal engines.
    pub fn is_high(self) -> bool {
        self != Level::Fast
    }

    /// True for levels handled by the optimal parser.
    pub fn is_optimal(self) -> bool {
        self >= Level::Opt10
    }

    /// Search parameters for the high-compression engines.
    pub fn params(self) -> LevelParams {
        // One row per level 0..=12. nb_searches bounds the number of chain
        // candidates examined per position; target_length is the match length
        // at which the optimal parser stops searching and emits immediately.
        const TABLE: [LevelParams; 13] = [
            LevelParams { nb_searches: 2, target_length: 16 },    // 0 (unused)
            LevelParams { nb_searches: 2, target_length: 16 },    // 1
            LevelParams { nb_searches: 2, target_length: 16 },    // 2
            LevelParams { nb_searches: 4, target_length: 16 },    // 3
            LevelParams { nb_searches: 8, target_length: 16 },    // 4
            LevelParams { nb_searches: 16, target_length: 16 },   // 5
            LevelParams { nb_searches: 32, target_length: 16 },   // 6
            LevelParams { nb_searches: 64, target_length: 16 },   // 7
            LevelParams { nb_searches: 128, target_length: 16 },  // 8
            LevelParams { nb_searches: 256, target_length: 16 },  // 9
            LevelParams { nb_searches: 96, target_length: 64 },   // 10
            LevelParams { nb_searches: 512, target_length: 128 }, // 11
            LevelParams { nb_searches: 16384, target_length: 4096 }, // 12
        ];
        TABLE[self as i32 as usize]
    }
}

/// Per-level tuning for the hash-chain and optimal engines.
#[derive(Debug, Clone, Copy)]
pub struct LevelParams {
    /// Maximum chain candidates examined per match search.
    pub nb_searches: u32,
    /// "Good enough" match length; longer matches end the search early.
    pub target_length: usize,
}
