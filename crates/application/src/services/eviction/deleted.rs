use super::{EvictionPolicy, DELETED_TRIM_BATCH};
use crate::ports::{Clock, EntryStore, EvictionTask, RankedLists, TaskScheduler};
use crate::services::eviction_metrics::EvictionMetrics;
use ferrous_cache_domain::{CacheAddr, EntryState, RankList};
use tracing::debug;

impl<T: TaskScheduler, C: Clock> EvictionPolicy<T, C> {
    /// Discards the oldest tombstones: a small batch per call, or the whole
    /// deleted list with `empty`.
    pub(super) fn trim_deleted<S: EntryStore>(&mut self, store: &mut S, empty: bool) {
        if store.is_disabled() {
            return;
        }

        debug!(
            empty,
            deleted = store.rankings().size(RankList::Deleted),
            "Trim deleted start"
        );
        EvictionMetrics::bump(&self.metrics.deleted_trims);

        let mut next = store.rankings().prev(None, RankList::Deleted);
        let mut deleted = false;
        let mut processed = 0;
        while let Some(node) = next {
            if !empty && processed >= DELETED_TRIM_BATCH {
                break;
            }
            next = store.rankings().prev(Some(node), RankList::Deleted);
            deleted |= self.remove_deleted_node(store, node);
            processed += 1;
            if self.test_mode {
                break;
            }
        }

        if deleted
            && !empty
            && !self.test_mode
            && store.rankings().size(RankList::Deleted) > self.max_deleted_length(&*store)
        {
            self.scheduler.post(EvictionTask::TrimDeleted);
        }

        debug!(processed, "Trim deleted end");
    }

    /// Dooms the tombstone at `node`. Returns `false` when it could not be
    /// resolved or was already being destroyed.
    fn remove_deleted_node<S: EntryStore>(&mut self, store: &mut S, node: CacheAddr) -> bool {
        let Some(mut entry) = store.resolve(node) else {
            EvictionMetrics::bump(&self.metrics.resolve_failures);
            debug!(addr = %node, "Failed to resolve tombstone");
            return false;
        };

        let doomed = entry.info.state == EntryState::Doomed;
        entry.info.state = EntryState::Doomed;
        store.persist(&entry);
        self.doom_entry(store, entry);
        EvictionMetrics::bump(&self.metrics.tombstones_removed);
        !doomed
    }
}
