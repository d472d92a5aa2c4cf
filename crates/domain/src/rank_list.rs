use std::fmt;

/// Reuse count at which an entry moves to the `HighUse` list.
pub const HIGH_USE_THRESHOLD: i32 = 10;

/// Identifies one of the ranked lists kept by the cache index.
///
/// The discriminants double as the list index used by the eviction
/// heuristics (`NoUse` is list 0, `HighUse` is list 2).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RankList {
    /// Entries that were never reused (the only list in legacy mode)
    NoUse = 0,
    /// Entries reused at least once, below the high-use threshold
    LowUse = 1,
    /// Entries reused `HIGH_USE_THRESHOLD` times or more
    HighUse = 2,
    /// Tombstones of evicted or doomed entries
    Deleted = 3,
}

impl RankList {
    /// The live lists, in eviction preference order.
    pub const TIERS: [RankList; 3] = [RankList::NoUse, RankList::LowUse, RankList::HighUse];

    pub const ALL: [RankList; 4] = [
        RankList::NoUse,
        RankList::LowUse,
        RankList::HighUse,
        RankList::Deleted,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Maps a reuse count to the live list that holds it.
    #[inline]
    pub fn for_reuse_count(reuse_count: i32) -> Self {
        if reuse_count <= 0 {
            RankList::NoUse
        } else if reuse_count < HIGH_USE_THRESHOLD {
            RankList::LowUse
        } else {
            RankList::HighUse
        }
    }

    pub fn is_tier(self) -> bool {
        self != RankList::Deleted
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankList::NoUse => "no_use",
            RankList::LowUse => "low_use",
            RankList::HighUse => "high_use",
            RankList::Deleted => "deleted",
        }
    }
}

impl fmt::Display for RankList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
