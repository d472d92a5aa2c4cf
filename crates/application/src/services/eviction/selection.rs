use super::{EvictionPolicy, TARGET_TIME_HOURS};
use crate::ports::{Clock, EntryStore, RankedLists, TaskScheduler};
use ferrous_cache_domain::{CacheAddr, RankList};
use tracing::debug;

impl<T: TaskScheduler, C: Clock> EvictionPolicy<T, C> {
    /// Picks the tier list a partial trim starts from, as an index into
    /// `RankList::TIERS`.
    pub(super) fn select_starting_list<S: EntryStore>(&self, store: &S) -> usize {
        let rankings = store.rankings();
        let tails = RankList::TIERS.map(|list| rankings.prev(None, list));

        if let Some(list) = (0..tails.len()).find(|&i| self.node_is_old_enough(store, tails[i], i)) {
            debug!(list = %RankList::TIERS[list], "Trimming by age");
            return list;
        }

        // Not meeting the time targets, move on to list length.
        let list = self.select_list_by_length(store, &tails);
        debug!(list = %RankList::TIERS[list], "Trimming by length");
        list
    }

    /// Whether the last use of `node` is older than the target time of the
    /// list at `list_index`. Each list doubles the target of the previous one.
    pub(super) fn node_is_old_enough<S: EntryStore>(
        &self,
        store: &S,
        node: Option<CacheAddr>,
        list_index: usize,
    ) -> bool {
        let Some(data) = node.and_then(|node| store.rankings().node_data(node)) else {
            return false;
        };

        let multiplier = 1i64 << list_index;
        (self.clock.now() - data.last_used).num_hours() > TARGET_TIME_HOURS * multiplier
    }

    /// Keeps the lists roughly the same length, without exhausting `NoUse`
    /// to protect young entries on the higher lists.
    pub(super) fn select_list_by_length<S: EntryStore>(
        &self,
        store: &S,
        tails: &[Option<CacheAddr>; 3],
    ) -> usize {
        let rankings = store.rankings();
        let data_entries = store.header().num_entries - rankings.size(RankList::Deleted);
        let no_use = rankings.size(RankList::NoUse);

        // Start by having each list to be roughly the same size.
        if no_use > data_entries / 3 {
            return RankList::NoUse.index();
        }

        let mut list = if rankings.size(RankList::LowUse) > data_entries / 3 {
            RankList::LowUse.index()
        } else {
            RankList::HighUse.index()
        };

        // Frequently used entries must be at least older than the NoUse target,
        // as long as that does not exhaust NoUse.
        if !self.node_is_old_enough(store, tails[list], 0) && no_use > data_entries / 10 {
            list = RankList::NoUse.index();
        }

        list
    }
}
