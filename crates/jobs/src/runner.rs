use crate::{StatsJob, TrimJob};
use ferrous_cache_application::ports::Clock;
use std::sync::Arc;
use tracing::info;

/// Central orchestrator for all background jobs.
///
/// Use the builder pattern to register jobs, then call `.start()` once.
///
/// # Example
///
/// ```rust,ignore
/// JobRunner::new()
///     .with_trim(TrimJob::new(cache.clone()).with_cancellation(token.clone()))
///     .with_stats(StatsJob::new(cache).with_cancellation(token))
///     .start()
///     .await;
/// ```
pub struct JobRunner<C: Clock + Clone> {
    trim: Option<TrimJob<C>>,
    stats: Option<StatsJob<C>>,
}

impl<C> JobRunner<C>
where
    C: Clock + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            trim: None,
            stats: None,
        }
    }

    pub fn with_trim(mut self, job: TrimJob<C>) -> Self {
        self.trim = Some(job);
        self
    }

    pub fn with_stats(mut self, job: StatsJob<C>) -> Self {
        self.stats = Some(job);
        self
    }

    /// Start all registered background jobs.
    pub async fn start(self) {
        info!("Starting background job runner");

        if let Some(job) = self.trim {
            Arc::new(job).start().await;
        }

        if let Some(job) = self.stats {
            Arc::new(job).start().await;
        }

        info!("All background jobs started");
    }
}

impl<C> Default for JobRunner<C>
where
    C: Clock + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
