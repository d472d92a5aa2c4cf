//! Ferrous Cache Domain Layer
pub mod cache_entry;
pub mod config;
pub mod errors;
pub mod index_header;
pub mod rank_list;

pub use cache_entry::{CacheAddr, CacheEntry, EntryInfo, EntryState, RankingsNode};
pub use config::{CliOverrides, Config, ConfigError};
pub use errors::CacheError;
pub use index_header::{Experiment, IndexHeader, LruData};
pub use rank_list::{RankList, HIGH_USE_THRESHOLD};
