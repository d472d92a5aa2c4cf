use crate::rank_list::RankList;
use chrono::{DateTime, Utc};
use std::fmt;

/// Address of an entry's rankings node inside the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheAddr(u32);

impl CacheAddr {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CacheAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Lifecycle of an entry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntryState {
    /// Live entry, member of one of the tier lists
    #[default]
    Normal,
    /// Data was discarded by a trim; metadata kept as a tombstone
    Evicted,
    /// Invalidated; waiting for physical removal
    Doomed,
}

impl EntryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryState::Normal => "normal",
            EntryState::Evicted => "evicted",
            EntryState::Doomed => "doomed",
        }
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted per-entry metadata used by the eviction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntryInfo {
    pub reuse_count: i32,
    pub refetch_count: i32,
    pub state: EntryState,
}

impl EntryInfo {
    /// Tier list implied by the reuse count.
    #[inline]
    pub fn tier(&self) -> RankList {
        RankList::for_reuse_count(self.reuse_count)
    }

    pub fn is_tombstone(&self) -> bool {
        self.state != EntryState::Normal
    }
}

/// Payload stored on a rankings node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingsNode {
    pub last_used: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    /// Write generation of the session currently using the entry, 0 when idle.
    pub dirty: u32,
}

impl RankingsNode {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            last_used: now,
            last_modified: now,
            dirty: 0,
        }
    }
}

/// A pinned entry handed to the eviction hooks.
///
/// The store owns the record; this is a working copy that the policy mutates
/// and flushes back through `EntryStore::persist`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub rankings: CacheAddr,
    pub info: EntryInfo,
}

impl CacheEntry {
    pub fn new(rankings: CacheAddr, info: EntryInfo) -> Self {
        Self { rankings, info }
    }

    pub fn state(&self) -> EntryState {
        self.info.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addr_display_is_hex() {
        assert_eq!(CacheAddr::new(0x2a).to_string(), "0x0000002a");
    }

    #[test]
    fn test_default_info_is_fresh_entry() {
        let info = EntryInfo::default();
        assert_eq!(info.state, EntryState::Normal);
        assert_eq!(info.tier(), RankList::NoUse);
        assert!(!info.is_tombstone());
    }
}
