use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Eviction counters, shared with whoever reports them.
#[derive(Debug, Default)]
pub struct EvictionMetrics {
    /// Trim passes started (partial trims only)
    pub trims: AtomicU64,
    /// Full clears started
    pub clears: AtomicU64,
    /// Entries evicted by partial trims
    pub trimmed_entries: AtomicU64,
    /// Trims continued on a later turn after exhausting the time slice
    pub rescheduled_trims: AtomicU64,
    /// Trims postponed because the store was loaded
    pub delayed_trims: AtomicU64,
    /// Trims run while loaded because the postpone budget ran out
    pub forced_trims: AtomicU64,
    /// Tombstone trim passes
    pub deleted_trims: AtomicU64,
    /// Tombstones physically removed
    pub tombstones_removed: AtomicU64,
    /// Nodes that could not be resolved to an entry during a walk
    pub resolve_failures: AtomicU64,
}

impl EvictionMetrics {
    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EvictionStats {
        EvictionStats {
            trims: self.trims.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            trimmed_entries: self.trimmed_entries.load(Ordering::Relaxed),
            rescheduled_trims: self.rescheduled_trims.load(Ordering::Relaxed),
            delayed_trims: self.delayed_trims.load(Ordering::Relaxed),
            forced_trims: self.forced_trims.load(Ordering::Relaxed),
            deleted_trims: self.deleted_trims.load(Ordering::Relaxed),
            tombstones_removed: self.tombstones_removed.load(Ordering::Relaxed),
            resolve_failures: self.resolve_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`EvictionMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvictionStats {
    pub trims: u64,
    pub clears: u64,
    pub trimmed_entries: u64,
    pub rescheduled_trims: u64,
    pub delayed_trims: u64,
    pub forced_trims: u64,
    pub deleted_trims: u64,
    pub tombstones_removed: u64,
    pub resolve_failures: u64,
}
