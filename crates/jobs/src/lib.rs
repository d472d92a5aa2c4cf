pub mod runner;
pub mod stats;
pub mod trim;

pub use runner::JobRunner;
pub use stats::{CacheReport, StatsJob};
pub use trim::TrimJob;

use ferrous_cache_infrastructure::cache::DiskCache;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cache handle shared between the request path and the background jobs.
pub type SharedCache<C> = Arc<Mutex<DiskCache<C>>>;
