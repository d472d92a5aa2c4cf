use crate::SharedCache;
use ferrous_cache_application::ports::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Host loop for deferred eviction work.
///
/// On every tick it runs the eviction tasks that are due and starts a trim if
/// the cache is still above its maximum size. Cancelling the job stops the
/// eviction policy for good.
pub struct TrimJob<C: Clock + Clone> {
    cache: SharedCache<C>,
    interval_ms: u64,
    shutdown: CancellationToken,
}

impl<C> TrimJob<C>
where
    C: Clock + Clone + Send + Sync + 'static,
{
    pub fn new(cache: SharedCache<C>) -> Self {
        Self {
            cache,
            interval_ms: 50,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Runs one tick. Returns the number of eviction tasks executed.
    pub async fn run_once(&self) -> usize {
        let mut cache = self.cache.lock().await;
        let ran = cache.run_pending_tasks();

        if cache.total_bytes() > cache.max_size() {
            debug!(
                num_bytes = cache.total_bytes(),
                max_size = cache.max_size(),
                "Cache above maximum size, trimming"
            );
            cache.trim();
        }
        ran
    }

    pub async fn start(self: Arc<Self>) {
        info!(interval_ms = self.interval_ms, "Starting cache trim job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(self.interval_ms));
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        self.cache.lock().await.stop();
                        info!("TrimJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let ran = self.run_once().await;
                        if ran > 0 {
                            debug!(ran, "Eviction tasks completed");
                        }
                    }
                }
            }
        });
    }
}
