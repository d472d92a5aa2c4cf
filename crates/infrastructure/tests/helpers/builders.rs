#![allow(dead_code)]
use ferrous_cache_application::ports::{EntryStore, RankedLists};
use ferrous_cache_domain::config::CacheConfig;
use ferrous_cache_domain::{EntryInfo, EntryState, RankList};
use ferrous_cache_infrastructure::cache::{DiskCache, ManualClock};
use std::sync::Arc;

pub const KIB: i64 = 1024;
pub const MIB: i64 = 1024 * KIB;

pub type TestCache = DiskCache<Arc<ManualClock>>;

/// Builds caches over a shared manual clock.
pub struct CacheBuilder {
    config: CacheConfig,
}

impl CacheBuilder {
    /// Tiered eviction with a 2 MiB maximum, so trims aim for 1 MiB.
    pub fn tiered() -> Self {
        Self {
            config: CacheConfig {
                max_size: 2 * MIB,
                new_eviction: true,
                deleted_list_experiment: false,
            },
        }
    }

    pub fn legacy() -> Self {
        let mut builder = Self::tiered();
        builder.config.new_eviction = false;
        builder
    }

    pub fn max_size(mut self, max_size: i64) -> Self {
        self.config.max_size = max_size;
        self
    }

    pub fn experiment(mut self) -> Self {
        self.config.deleted_list_experiment = true;
        self
    }

    pub fn build(self) -> (TestCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = DiskCache::new(&self.config, Arc::clone(&clock));
        (cache, clock)
    }
}

pub fn key(prefix: &str, i: usize) -> String {
    format!("{prefix}-{i}")
}

/// Creates `count` entries named `prefix-0..count`, oldest first.
pub fn fill(cache: &mut TestCache, prefix: &str, count: usize, size: i64) -> Vec<String> {
    (0..count)
        .map(|i| {
            let key = key(prefix, i);
            cache.create_entry(&key, size).unwrap();
            key
        })
        .collect()
}

pub fn open_times(cache: &mut TestCache, key: &str, times: usize) {
    for _ in 0..times {
        cache.open_entry(key).unwrap();
    }
}

pub fn info_of(cache: &TestCache, key: &str) -> Option<EntryInfo> {
    let addr = cache.store().find(key)?;
    cache.store().info(addr)
}

pub fn state_of(cache: &TestCache, key: &str) -> Option<EntryState> {
    info_of(cache, key).map(|info| info.state)
}

pub fn list_of(cache: &TestCache, key: &str) -> Option<RankList> {
    let addr = cache.store().find(key)?;
    cache.store().memory_rankings().list_of(addr)
}

pub fn list_keys(cache: &TestCache, list: RankList) -> Vec<String> {
    cache
        .store()
        .memory_rankings()
        .iter(list)
        .into_iter()
        .filter_map(|addr| cache.store().key_of(addr).map(str::to_string))
        .collect()
}

pub fn list_size(cache: &TestCache, list: RankList) -> i32 {
    cache.list_stats().size(list)
}

pub fn assert_consistent(cache: &TestCache) {
    let problems = cache.store().check_consistency();
    assert!(problems.is_empty(), "inconsistent store: {problems:#?}");
}

pub fn assert_fully_cleared(cache: &TestCache) {
    assert_eq!(cache.entry_count(), 0);
    assert_eq!(cache.total_bytes(), 0);
    for list in RankList::ALL {
        assert_eq!(cache.store().rankings().size(list), 0, "{list} not empty");
    }
    assert_eq!(cache.store().memory_rankings().node_count(), 0);
}
