pub mod eviction;
pub mod eviction_metrics;

pub use eviction::{EvictionPolicy, ListStats};
pub use eviction_metrics::{EvictionMetrics, EvictionStats};
