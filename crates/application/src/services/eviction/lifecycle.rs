use super::{invariant_violation, EvictionPolicy};
use crate::ports::{Clock, EntryStore, RankedLists, TaskScheduler};
use ferrous_cache_domain::{CacheEntry, EntryState, RankList, HIGH_USE_THRESHOLD};
use tracing::debug;

impl<T: TaskScheduler, C: Clock> EvictionPolicy<T, C> {
    /// Refreshes the entry's position within its current list.
    pub fn update_rank<S: EntryStore>(&mut self, store: &mut S, entry: &CacheEntry, modified: bool) {
        let list = self.list_for_entry(entry);
        store
            .rankings_mut()
            .update_rank(entry.rankings, modified, list);
    }

    /// An existing entry was opened by a caller.
    pub fn on_open_entry<S: EntryStore>(&mut self, store: &mut S, entry: &mut CacheEntry) {
        if self.new_eviction {
            self.on_open_entry_tiered(store, entry);
        }
    }

    /// A new entry was created, or an evicted one was created again.
    pub fn on_create_entry<S: EntryStore>(&mut self, store: &mut S, entry: &mut CacheEntry) {
        if self.new_eviction {
            return self.on_create_entry_tiered(store, entry);
        }

        let list = self.list_for_entry(entry);
        store.rankings_mut().insert(entry.rankings, true, list);
    }

    /// A live entry was invalidated by the application.
    pub fn on_doom_entry<S: EntryStore>(&mut self, store: &mut S, entry: &mut CacheEntry) {
        if self.new_eviction {
            return self.on_doom_entry_tiered(store, entry);
        }

        let list = self.list_for_entry(entry);
        store.rankings_mut().remove(entry.rankings, list);
    }

    /// The storage of a doomed entry is about to be released.
    pub fn on_destroy_entry<S: EntryStore>(&mut self, store: &mut S, entry: &CacheEntry) {
        if self.new_eviction {
            store
                .rankings_mut()
                .remove(entry.rankings, RankList::Deleted);
        }
    }

    /// Dooms `entry` and releases its storage, keeping the lists consistent.
    pub fn doom_entry<S: EntryStore>(&mut self, store: &mut S, mut entry: CacheEntry) {
        self.on_doom_entry(store, &mut entry);
        self.on_destroy_entry(store, &entry);
        store.doom(&entry);
        store.release(entry);
    }

    fn on_open_entry_tiered<S: EntryStore>(&mut self, store: &mut S, entry: &mut CacheEntry) {
        if entry.info.state != EntryState::Normal {
            return invariant_violation(entry, "opened an entry that is not live");
        }

        if entry.info.reuse_count == i32::MAX {
            return;
        }

        entry.info.reuse_count += 1;
        store.persist(entry);

        // We may need to move this to a new list.
        let (from, to) = match entry.info.reuse_count {
            1 => (RankList::NoUse, RankList::LowUse),
            HIGH_USE_THRESHOLD => (RankList::LowUse, RankList::HighUse),
            _ => return,
        };

        let rankings = store.rankings_mut();
        rankings.remove(entry.rankings, from);
        rankings.insert(entry.rankings, true, to);
        debug!(
            addr = %entry.rankings,
            reuse_count = entry.info.reuse_count,
            %from,
            %to,
            "Entry promoted"
        );
    }

    fn on_create_entry_tiered<S: EntryStore>(&mut self, store: &mut S, entry: &mut CacheEntry) {
        match entry.info.state {
            EntryState::Normal => {
                if entry.info.reuse_count != 0 || entry.info.refetch_count != 0 {
                    invariant_violation(entry, "new entry carries reuse history");
                }
            }
            EntryState::Evicted => {
                let info = &mut entry.info;
                info.refetch_count = info.refetch_count.saturating_add(1);

                if info.refetch_count > HIGH_USE_THRESHOLD && info.reuse_count < HIGH_USE_THRESHOLD {
                    info.reuse_count = HIGH_USE_THRESHOLD;
                } else {
                    info.reuse_count = info.reuse_count.saturating_add(1);
                }
                info.state = EntryState::Normal;
                store.persist(entry);
                store
                    .rankings_mut()
                    .remove(entry.rankings, RankList::Deleted);

                debug!(
                    addr = %entry.rankings,
                    reuse_count = entry.info.reuse_count,
                    refetch_count = entry.info.refetch_count,
                    "Evicted entry fetched again"
                );
            }
            EntryState::Doomed => {
                return invariant_violation(entry, "created an entry that is doomed");
            }
        }

        let list = self.list_for_entry(entry);
        store.rankings_mut().insert(entry.rankings, true, list);
    }

    fn on_doom_entry_tiered<S: EntryStore>(&mut self, store: &mut S, entry: &mut CacheEntry) {
        if entry.info.state != EntryState::Normal {
            return;
        }

        let list = self.list_for_entry(entry);
        store.rankings_mut().remove(entry.rankings, list);

        entry.info.state = EntryState::Doomed;
        store.persist(entry);
        store
            .rankings_mut()
            .insert(entry.rankings, true, RankList::Deleted);
    }
}
