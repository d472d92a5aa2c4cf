use std::fmt;
use std::time::Duration;

/// Deferred work the eviction policy hands back to the host loop.
///
/// The host runs a posted task by calling `EvictionPolicy::run_task`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EvictionTask {
    /// Continue a trim that ran out of its time slice.
    TrimCache,
    /// Re-check a trim that was postponed while the store was loaded.
    DelayedTrim,
    /// Discard another batch of tombstones.
    TrimDeleted,
}

impl EvictionTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionTask::TrimCache => "trim_cache",
            EvictionTask::DelayedTrim => "delayed_trim",
            EvictionTask::TrimDeleted => "trim_deleted",
        }
    }
}

impl fmt::Display for EvictionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-layer port for the host loop's deferred work queue.
pub trait TaskScheduler {
    /// Run `task` at the next opportunity.
    fn post(&mut self, task: EvictionTask);

    /// Run `task` once `delay` has elapsed.
    fn post_delayed(&mut self, task: EvictionTask, delay: Duration);

    /// Drop every task that has not run yet.
    fn revoke_all(&mut self);
}
