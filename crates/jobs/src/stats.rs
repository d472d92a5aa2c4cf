use crate::SharedCache;
use ferrous_cache_application::ports::Clock;
use ferrous_cache_application::services::{EvictionStats, ListStats};
use ferrous_cache_infrastructure::cache::DiskCache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Snapshot of the cache size, list shape and eviction counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheReport {
    pub num_entries: i32,
    pub num_bytes: i64,
    pub max_size: i64,
    pub target_size: i64,
    pub new_eviction: bool,
    pub pending_tasks: usize,
    pub lists: ListStats,
    pub eviction: EvictionStats,
}

impl CacheReport {
    pub fn capture<C: Clock + Clone>(cache: &DiskCache<C>) -> Self {
        Self {
            num_entries: cache.entry_count(),
            num_bytes: cache.total_bytes(),
            max_size: cache.max_size(),
            target_size: cache.eviction().target_size(),
            new_eviction: cache.eviction().is_new_eviction(),
            pending_tasks: cache.pending_tasks(),
            lists: cache.list_stats(),
            eviction: cache.metrics().snapshot(),
        }
    }
}

/// Periodically logs a `CacheReport`.
pub struct StatsJob<C: Clock + Clone> {
    cache: SharedCache<C>,
    interval_secs: u64,
    shutdown: CancellationToken,
}

impl<C> StatsJob<C>
where
    C: Clock + Clone + Send + Sync + 'static,
{
    pub fn new(cache: SharedCache<C>) -> Self {
        Self {
            cache,
            interval_secs: 60,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn report(&self) -> CacheReport {
        CacheReport::capture(&*self.cache.lock().await)
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_secs = self.interval_secs, "Starting cache stats job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("StatsJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let report = self.report().await;
                        info!(
                            num_entries = report.num_entries,
                            num_bytes = report.num_bytes,
                            sizes = ?report.lists.sizes,
                            trims = report.eviction.trims,
                            trimmed_entries = report.eviction.trimmed_entries,
                            tombstones_removed = report.eviction.tombstones_removed,
                            "Cache stats"
                        );
                    }
                }
            }
        });
    }
}
