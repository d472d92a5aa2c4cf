use ferrous_cache_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        max_size = config.cache.max_size,
        new_eviction = config.cache.new_eviction,
        deleted_list_experiment = config.cache.deleted_list_experiment,
        trim_interval_ms = config.jobs.trim_interval_ms,
        "Configuration loaded"
    );

    Ok(config)
}
