use super::{CacheConfig, ConfigError, JobsConfig, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub jobs: JobsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values passed on the command line take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_size: Option<i64>,
    pub legacy_eviction: bool,
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from `path` (or defaults) and apply CLI overrides.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if Path::new(path).exists() => {
                let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;
                Self::from_toml(&raw)?
            }
            Some(path) => {
                return Err(ConfigError::FileRead {
                    path: path.to_string(),
                    reason: "file does not exist".to_string(),
                })
            }
            None => Self::default(),
        };

        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(max_size) = overrides.max_size {
            self.cache.max_size = max_size;
        }
        if overrides.legacy_eviction {
            self.cache.new_eviction = false;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_size <= 0 {
            return Err(ConfigError::Validation(
                "cache.max_size must be greater than zero".to_string(),
            ));
        }
        if self.jobs.trim_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "jobs.trim_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(ConfigError::Validation(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }
        Ok(())
    }
}
