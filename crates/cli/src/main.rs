//! # Ferrous Cache
//!
//! Replays a synthetic request stream against the disk cache and reports how
//! the eviction policy coped with it.

mod bootstrap;
mod simulator;

use clap::Parser;
use ferrous_cache_domain::CliOverrides;
use ferrous_cache_infrastructure::cache::{DiskCache, SystemClock};
use ferrous_cache_jobs::{CacheReport, JobRunner, SharedCache, StatsJob, TrimJob};
use simulator::{SimulationReport, Workload};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "ferrous-cache")]
#[command(version)]
#[command(about = "Disk cache eviction simulator")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Maximum bytes of cached data
    #[arg(short = 's', long)]
    max_size: Option<i64>,

    /// Use the single-list LRU instead of the reuse tiers
    #[arg(long)]
    legacy: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    /// Requests to replay
    #[arg(short = 'n', long, default_value = "100000")]
    ops: usize,

    /// Distinct keys in the request stream
    #[arg(short = 'k', long, default_value = "5000")]
    keys: usize,

    /// Smallest entry, in KiB
    #[arg(long, default_value = "4")]
    min_entry_kib: i64,

    /// Largest entry, in KiB
    #[arg(long, default_value = "256")]
    max_entry_kib: i64,

    /// Percentage of requests that doom their key
    #[arg(long, default_value = "2")]
    doom_percent: u8,

    /// Percentage of hits that rewrite the entry
    #[arg(long, default_value = "10")]
    write_percent: u8,

    /// Seed for the request stream
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        max_size: cli.max_size,
        legacy_eviction: cli.legacy,
        log_level: cli.log_level.clone(),
    };
    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);

    let workload = Workload {
        ops: cli.ops,
        keys: cli.keys,
        min_entry_kib: cli.min_entry_kib,
        max_entry_kib: cli.max_entry_kib,
        doom_percent: cli.doom_percent,
        write_percent: cli.write_percent,
        seed: cli.seed,
    };
    workload.validate()?;

    let cache: SharedCache<SystemClock> =
        Arc::new(Mutex::new(DiskCache::new(&config.cache, SystemClock)));
    let shutdown = CancellationToken::new();

    JobRunner::new()
        .with_trim(
            TrimJob::new(cache.clone())
                .with_interval(config.jobs.trim_interval_ms)
                .with_cancellation(shutdown.clone()),
        )
        .with_stats(
            StatsJob::new(cache.clone())
                .with_interval(config.jobs.stats_interval_secs)
                .with_cancellation(shutdown.clone()),
        )
        .start()
        .await;

    info!(ops = workload.ops, keys = workload.keys, seed = workload.seed, "Replaying workload");
    let started = Instant::now();
    let outcome = simulator::run_workload(&cache, &workload).await;
    let elapsed = started.elapsed();

    // One more tick lets the trim job run the tasks posted at the end.
    tokio::time::sleep(Duration::from_millis(config.jobs.trim_interval_ms * 2)).await;
    let report = SimulationReport {
        hit_rate: outcome.hit_rate(),
        workload: outcome,
        cache: CacheReport::capture(&*cache.lock().await),
    };
    shutdown.cancel();

    info!(elapsed_ms = elapsed.as_millis() as u64, "Workload finished");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &SimulationReport) {
    let workload = &report.workload;
    let cache = &report.cache;
    let eviction = &cache.eviction;

    println!("requests        {}", workload.ops);
    println!(
        "hits / misses   {} / {} ({:.1}% hit rate)",
        workload.hits,
        workload.misses,
        report.hit_rate * 100.0
    );
    println!("refetches       {}", workload.refetches);
    println!("writes / dooms  {} / {}", workload.writes, workload.dooms);
    println!(
        "cache           {} entries, {} of {} bytes",
        cache.num_entries, cache.num_bytes, cache.max_size
    );
    println!(
        "lists           no_use={} low_use={} high_use={} deleted={}",
        cache.lists.sizes[0], cache.lists.sizes[1], cache.lists.sizes[2], cache.lists.sizes[3]
    );
    println!(
        "trims           {} ({} entries, {} rescheduled, {} forced)",
        eviction.trims, eviction.trimmed_entries, eviction.rescheduled_trims, eviction.forced_trims
    );
    println!(
        "tombstones      {} removed in {} passes",
        eviction.tombstones_removed, eviction.deleted_trims
    );
}
