#![allow(dead_code)]

use ferrous_cache_domain::config::CacheConfig;
use ferrous_cache_infrastructure::cache::{DiskCache, ManualClock};
use ferrous_cache_jobs::SharedCache;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const KIB: i64 = 1024;
pub const MIB: i64 = 1024 * KIB;

pub type TestCache = SharedCache<Arc<ManualClock>>;

/// Cache with a 2 MiB maximum over a manual clock.
pub fn shared_cache(new_eviction: bool) -> (TestCache, Arc<ManualClock>) {
    let config = CacheConfig {
        max_size: 2 * MIB,
        new_eviction,
        deleted_list_experiment: false,
    };
    let clock = Arc::new(ManualClock::new());
    let cache = DiskCache::new(&config, Arc::clone(&clock));
    (Arc::new(Mutex::new(cache)), clock)
}

pub async fn fill(cache: &TestCache, prefix: &str, count: usize, size: i64) {
    let mut cache = cache.lock().await;
    for i in 0..count {
        cache.create_entry(&format!("{prefix}-{i}"), size).unwrap();
    }
}
