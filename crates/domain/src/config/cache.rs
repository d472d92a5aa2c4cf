use crate::index_header::Experiment;
use serde::{Deserialize, Serialize};

/// Store sizing and eviction mode
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum bytes of entry data (default: 80 MiB)
    #[serde(default = "default_max_size")]
    pub max_size: i64,

    /// Use the reuse-tiered eviction lists instead of a single LRU (default: true)
    #[serde(default = "default_true")]
    pub new_eviction: bool,

    /// Enroll the index in the deleted-list trial (default: false)
    #[serde(default)]
    pub deleted_list_experiment: bool,
}

impl CacheConfig {
    pub fn experiment(&self) -> Experiment {
        if self.deleted_list_experiment {
            Experiment::DeletedListIn
        } else {
            Experiment::None
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            new_eviction: true,
            deleted_list_experiment: false,
        }
    }
}

fn default_max_size() -> i64 {
    80 * 1024 * 1024
}

fn default_true() -> bool {
    true
}
