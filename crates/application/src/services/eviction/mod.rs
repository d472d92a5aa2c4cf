//! Eviction policy for the disk cache.
//!
//! Two algorithms share this type and are never mixed within one cache:
//!
//! * **Legacy**: a pure LRU. Every entry lives on `RankList::NoUse` and entries
//!   at the tail are evicted until `CLEANUP_MARGIN` bytes are free.
//! * **Tiered**: entries move from `NoUse` to `LowUse` on their first reuse and
//!   to `HighUse` once reused `HIGH_USE_THRESHOLD` times. Evicting an entry
//!   drops its data but keeps its record on `RankList::Deleted`, so a key that
//!   is fetched again is recognised and placed on a higher list. Eviction
//!   prefers `NoUse`, then `LowUse`, then `HighUse`, trying to keep entries for
//!   at least `TARGET_TIME_HOURS` (twice as long on each successive list), and
//!   falls back to keeping the lists roughly the same length.
//!
//! The policy never blocks its caller for long: a trim that runs past
//! `TRIM_SLICE` posts an `EvictionTask::TrimCache` continuation and returns.

mod deleted;
mod lifecycle;
mod selection;
mod trim;

use crate::ports::{Clock, EntryStore, EvictionTask, RankedLists, TaskScheduler};
use crate::services::eviction_metrics::EvictionMetrics;
use chrono::{DateTime, Utc};
use ferrous_cache_domain::{CacheEntry, Experiment, RankList};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Free space kept below the configured maximum size after a trim.
pub const CLEANUP_MARGIN: i64 = 1024 * 1024;
/// Hours an entry should stay on `NoUse` before it is old enough to evict.
pub const TARGET_TIME_HOURS: i64 = 24 * 7;
/// Consecutive postponed trims tolerated while the store is loaded.
pub const MAX_DELAYED_TRIMS: u32 = 60;
/// Wall-clock budget of a trim before it yields.
pub const TRIM_SLICE: Duration = Duration::from_millis(20);
/// Delay before re-checking a postponed trim.
pub const DELAYED_TRIM_INTERVAL: Duration = Duration::from_secs(1);
/// Tombstones discarded per `TrimDeleted` task.
pub const DELETED_TRIM_BATCH: usize = 4;

fn low_water_adjust(high_water: i64) -> i64 {
    if high_water < CLEANUP_MARGIN {
        return 0;
    }
    high_water - CLEANUP_MARGIN
}

/// Tail ages and lengths of the ranked lists, indexed by `RankList::index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListStats {
    pub sizes: [i32; 4],
    pub tail_age_secs: [Option<i64>; 4],
}

impl ListStats {
    pub fn size(&self, list: RankList) -> i32 {
        self.sizes[list.index()]
    }

    pub fn tail_age_secs(&self, list: RankList) -> Option<i64> {
        self.tail_age_secs[list.index()]
    }
}

pub struct EvictionPolicy<T, C> {
    scheduler: T,
    clock: C,
    metrics: Arc<EvictionMetrics>,
    max_size: i64,
    new_eviction: bool,
    in_experiment: bool,
    first_trim: bool,
    trimming: bool,
    delay_trim: bool,
    trim_delays: u32,
    init: bool,
    test_mode: bool,
}

impl<T: TaskScheduler, C: Clock> EvictionPolicy<T, C> {
    pub fn new(scheduler: T, clock: C) -> Self {
        Self {
            scheduler,
            clock,
            metrics: Arc::new(EvictionMetrics::default()),
            max_size: 0,
            new_eviction: false,
            in_experiment: false,
            first_trim: true,
            trimming: false,
            delay_trim: false,
            trim_delays: 0,
            init: false,
            test_mode: false,
        }
    }

    /// Captures the store's sizing and eviction mode. Must run once, before
    /// any other method.
    pub fn init<S: EntryStore>(&mut self, store: &S) {
        let header = store.header();
        self.max_size = low_water_adjust(store.max_size());
        self.new_eviction = header.new_eviction;
        self.in_experiment = header.experiment == Experiment::DeletedListIn;
        self.first_trim = true;
        self.trimming = false;
        self.delay_trim = false;
        self.trim_delays = 0;
        self.init = true;
        self.test_mode = false;

        info!(
            target_size = self.max_size,
            new_eviction = self.new_eviction,
            in_experiment = self.in_experiment,
            "Eviction policy initialized"
        );
    }

    /// Refuses any further trim from now on and revokes pending tasks.
    pub fn stop(&mut self) {
        // Initialization of the store may have failed before `init` ran.
        if !self.init {
            return;
        }

        debug_assert!(!self.trimming, "stop() called from inside a trim");
        self.trimming = true;
        self.scheduler.revoke_all();
        info!("Eviction policy stopped");
    }

    /// Runs a task previously handed to the scheduler.
    pub fn run_task<S: EntryStore>(&mut self, store: &mut S, task: EvictionTask) {
        if self.trimming {
            debug!(%task, "Dropping eviction task, policy is stopped");
            return;
        }

        match task {
            EvictionTask::TrimCache => self.trim_cache(store, false),
            EvictionTask::DelayedTrim => self.delayed_trim(store),
            EvictionTask::TrimDeleted => self.trim_deleted(store, false),
        }
    }

    /// Makes every trim evict a single entry and every tombstone trim process
    /// a single node, without scheduling follow-up work.
    pub fn set_test_mode(&mut self) {
        self.test_mode = true;
    }

    /// Runs a tombstone trim directly. Tiered mode under test mode only.
    pub fn trim_deleted_list<S: EntryStore>(&mut self, store: &mut S, empty: bool) {
        debug_assert!(self.test_mode && self.new_eviction);
        self.trim_deleted(store, empty);
    }

    pub fn list_stats<S: EntryStore>(&self, store: &S) -> ListStats {
        let now = self.clock.now();
        let rankings = store.rankings();
        let mut stats = ListStats::default();

        for list in RankList::ALL {
            stats.sizes[list.index()] = rankings.size(list);
            stats.tail_age_secs[list.index()] = rankings
                .prev(None, list)
                .and_then(|node| rankings.node_data(node))
                .map(|data| (now - data.last_used).num_seconds());
        }
        stats
    }

    pub fn metrics(&self) -> Arc<EvictionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Bytes a partial trim brings the store down to.
    pub fn target_size(&self) -> i64 {
        self.max_size
    }

    pub fn is_new_eviction(&self) -> bool {
        self.new_eviction
    }

    pub fn is_trimming(&self) -> bool {
        self.trimming
    }

    pub fn trim_delays(&self) -> u32 {
        self.trim_delays
    }

    fn list_for_entry(&self, entry: &CacheEntry) -> RankList {
        if self.new_eviction {
            entry.info.tier()
        } else {
            RankList::NoUse
        }
    }

    /// Longest the deleted list may grow before tombstones are trimmed.
    fn max_deleted_length<S: EntryStore>(&self, store: &S) -> i32 {
        // Normally 25% of the entries are tombstones. The experiment doubles
        // them, growing the total by 25%; 40% of that keeps the three live
        // lists at their usual size.
        let num_entries = store.header().num_entries;
        if self.in_experiment {
            num_entries * 2 / 5
        } else {
            num_entries / 4
        }
    }
}

/// Marker stamped on headers that predate `create_time`.
fn legacy_create_time() -> Option<DateTime<Utc>> {
    use chrono::TimeZone;
    Utc.with_ymd_and_hms(2009, 3, 1, 0, 0, 0).single()
}

#[cold]
fn invariant_violation(entry: &CacheEntry, message: &'static str) {
    error!(
        addr = %entry.rankings,
        state = %entry.info.state,
        reuse_count = entry.info.reuse_count,
        refetch_count = entry.info.refetch_count,
        "{message}"
    );
    if cfg!(debug_assertions) {
        panic!("{message} (entry {})", entry.rankings);
    }
}
