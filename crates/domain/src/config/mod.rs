//! Configuration module for Ferrous Cache
//!
//! - `root`: Main configuration and CLI overrides
//! - `cache`: Store sizing and eviction mode
//! - `jobs`: Host loop timing
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod cache;
pub mod errors;
pub mod jobs;
pub mod logging;
pub mod root;

pub use cache::CacheConfig;
pub use errors::ConfigError;
pub use jobs::JobsConfig;
pub use logging::LoggingConfig;
pub use root::{CliOverrides, Config};
