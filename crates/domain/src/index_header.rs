use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Field trials recorded in the index header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Experiment {
    #[default]
    None,
    /// Control group of the deleted-list trial
    DeletedListOut,
    /// Keeps twice as many tombstones on the deleted list
    DeletedListIn,
}

/// Eviction bookkeeping persisted with the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LruData {
    /// Set once the cache had to evict its first entry.
    pub filled: bool,
}

/// Statistics block of the cache index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexHeader {
    /// Entry records, tombstones included.
    pub num_entries: i32,
    /// Bytes of entry data currently stored.
    pub num_bytes: i64,
    pub lru: LruData,
    pub experiment: Experiment,
    pub create_time: Option<DateTime<Utc>>,
    /// Selects the tiered eviction algorithm.
    pub new_eviction: bool,
}

impl IndexHeader {
    pub fn new(new_eviction: bool, experiment: Experiment) -> Self {
        Self {
            new_eviction,
            experiment,
            ..Default::default()
        }
    }
}
