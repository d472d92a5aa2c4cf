use super::{
    invariant_violation, EvictionPolicy, DELAYED_TRIM_INTERVAL, MAX_DELAYED_TRIMS, TRIM_SLICE,
};
use crate::ports::{Clock, EntryStore, EvictionTask, RankedLists, TaskScheduler};
use crate::services::eviction_metrics::EvictionMetrics;
use ferrous_cache_domain::{CacheAddr, EntryState, RankList};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

impl<T: TaskScheduler, C: Clock> EvictionPolicy<T, C> {
    /// Evicts entries until the store is back under its target size.
    ///
    /// With `empty` every entry is removed. A partial trim is postponed while
    /// the store is loaded, and yields with a `TrimCache` continuation once it
    /// exceeds its time slice.
    #[instrument(skip(self, store))]
    pub fn trim_cache<S: EntryStore>(&mut self, store: &mut S, empty: bool) {
        if store.is_disabled() || self.trimming {
            return;
        }

        if !empty && !self.should_trim(&*store) {
            return self.post_delayed_trim();
        }

        if empty {
            EvictionMetrics::bump(&self.metrics.clears);
        } else {
            EvictionMetrics::bump(&self.metrics.trims);
        }

        if self.new_eviction {
            return self.trim_cache_tiered(store, empty);
        }

        debug!(num_bytes = store.header().num_bytes, "Trim cache start");
        self.trimming = true;
        let start = self.clock.instant();
        self.trim_list(store, RankList::NoUse, empty, start);
        self.log_trim_end(&*store, empty, start);
        self.trimming = false;
    }

    fn trim_cache_tiered<S: EntryStore>(&mut self, store: &mut S, empty: bool) {
        debug!(num_bytes = store.header().num_bytes, "Trim cache start");
        self.trimming = true;
        let start = self.clock.instant();

        let first = if empty {
            0
        } else {
            self.select_starting_list(&*store)
        };

        for &list in &RankList::TIERS[first..] {
            self.trim_list(store, list, empty, start);
            // List selection runs again on the next pass.
            if !empty {
                break;
            }
        }

        if empty {
            self.trim_deleted(store, true);
        } else if !self.test_mode
            && store.rankings().size(RankList::Deleted) > self.max_deleted_length(&*store)
        {
            self.scheduler.post(EvictionTask::TrimDeleted);
        }

        self.log_trim_end(&*store, empty, start);
        self.trimming = false;
    }

    /// Walks `list` from the tail, evicting idle entries until the store is
    /// under the target size or the list runs out.
    fn trim_list<S: EntryStore>(&mut self, store: &mut S, list: RankList, empty: bool, start: Instant) {
        let target_size = if empty { 0 } else { self.max_size };
        let mut next = store.rankings().prev(None, list);
        if let Some(node) = next {
            store.rankings_mut().track(node, true);
        }

        while let Some(node) = next {
            if !empty && !self.test_mode && store.header().num_bytes <= target_size {
                break;
            }

            // The iterator could be invalidated within evict_entry().
            let Some(data) = store.rankings().node_data(node) else {
                break;
            };

            next = store.rankings().prev(Some(node), list);
            if let Some(prev) = next {
                store.rankings_mut().track(prev, true);
            }
            // Do NOT use node as an iterator after this point.
            store.rankings_mut().track(node, false);

            if data.dirty == store.current_entry_id() && !empty {
                // Someone is writing to this entry.
                continue;
            }

            if !self.evict_entry(store, node, empty) && !self.test_mode {
                continue;
            }

            if empty {
                continue;
            }

            EvictionMetrics::bump(&self.metrics.trimmed_entries);
            if self.test_mode {
                break;
            }

            if self.clock.instant().duration_since(start) > TRIM_SLICE {
                EvictionMetrics::bump(&self.metrics.rescheduled_trims);
                debug!(%list, num_bytes = store.header().num_bytes, "Trim slice exhausted, continuing later");
                self.scheduler.post(EvictionTask::TrimCache);
                break;
            }
        }

        if let Some(node) = next {
            store.rankings_mut().track(node, false);
        }
    }

    /// Removes the entry owning `node`. Returns `false` when the node no longer
    /// belongs to a live entry.
    pub(super) fn evict_entry<S: EntryStore>(&mut self, store: &mut S, node: CacheAddr, empty: bool) -> bool {
        let Some(mut entry) = store.resolve(node) else {
            EvictionMetrics::bump(&self.metrics.resolve_failures);
            debug!(addr = %node, "Failed to resolve entry during trim");
            return false;
        };

        self.report_trim_times(store, node);

        if empty || !self.new_eviction {
            self.doom_entry(store, entry);
            return true;
        }

        if entry.info.state != EntryState::Normal {
            invariant_violation(&entry, "evicting an entry that is not live");
            store.release(entry);
            return false;
        }

        store.delete_data_only(&entry);
        let list = self.list_for_entry(&entry);
        store.rankings_mut().remove(node, list);
        entry.info.state = EntryState::Evicted;
        store.persist(&entry);
        store.rankings_mut().insert(node, true, RankList::Deleted);
        store.release(entry);
        true
    }

    fn should_trim<S: EntryStore>(&mut self, store: &S) -> bool {
        let loaded = store.is_loaded();
        if self.trim_delays < MAX_DELAYED_TRIMS && loaded {
            return false;
        }

        if loaded {
            // Progress beats waiting for an idle store forever.
            EvictionMetrics::bump(&self.metrics.forced_trims);
            warn!(trim_delays = self.trim_delays, "Trimming while the store is still loaded");
        } else if self.trim_delays > 0 {
            debug!(trim_delays = self.trim_delays, "Running postponed trim");
        }
        self.trim_delays = 0;
        true
    }

    fn post_delayed_trim(&mut self) {
        // Prevent posting multiple tasks.
        if self.delay_trim {
            return;
        }
        self.delay_trim = true;
        self.trim_delays += 1;
        EvictionMetrics::bump(&self.metrics.delayed_trims);
        self.scheduler
            .post_delayed(EvictionTask::DelayedTrim, DELAYED_TRIM_INTERVAL);
    }

    pub(super) fn delayed_trim<S: EntryStore>(&mut self, store: &mut S) {
        self.delay_trim = false;
        if self.trim_delays < MAX_DELAYED_TRIMS && store.is_loaded() {
            return self.post_delayed_trim();
        }

        self.trim_cache(store, false);
    }

    fn report_trim_times<S: EntryStore>(&mut self, store: &mut S, node: CacheAddr) {
        if !self.first_trim {
            return;
        }
        self.first_trim = false;

        let now = self.clock.now();
        let age_secs = store
            .rankings()
            .node_data(node)
            .map(|data| (now - data.last_used).num_seconds());
        let stats = self.list_stats(&*store);
        info!(
            age_secs,
            sizes = ?stats.sizes,
            tail_age_secs = ?stats.tail_age_secs,
            "First trim of this session"
        );

        if store.header().lru.filled {
            return;
        }
        store.header_mut().lru.filled = true;

        if store.header().create_time.is_some() {
            store.on_first_eviction();
        } else {
            store.header_mut().create_time = super::legacy_create_time();
        }
    }

    fn log_trim_end<S: EntryStore>(&self, store: &S, empty: bool, start: Instant) {
        let elapsed_us = self.clock.instant().duration_since(start).as_micros() as u64;
        if empty {
            info!(elapsed_us, num_entries = store.header().num_entries, "Cache cleared");
        } else {
            debug!(
                elapsed_us,
                num_bytes = store.header().num_bytes,
                target_size = self.max_size,
                "Trim cache end"
            );
        }
    }
}
