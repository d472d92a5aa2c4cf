use serde::{Deserialize, Serialize};

/// Background job timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobsConfig {
    /// Host loop tick in milliseconds (default: 50)
    #[serde(default = "default_trim_interval_ms")]
    pub trim_interval_ms: u64,

    /// Seconds between cache stats reports (default: 60)
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            trim_interval_ms: default_trim_interval_ms(),
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

fn default_trim_interval_ms() -> u64 {
    50
}

fn default_stats_interval_secs() -> u64 {
    60
}
