use ferrous_cache_application::ports::Clock;
use ferrous_cache_domain::CacheError;
use ferrous_cache_jobs::{CacheReport, SharedCache};
use serde::Serialize;
use tracing::debug;

/// Synthetic request stream.
#[derive(Debug, Clone)]
pub struct Workload {
    pub ops: usize,
    pub keys: usize,
    pub min_entry_kib: i64,
    pub max_entry_kib: i64,
    pub doom_percent: u8,
    pub write_percent: u8,
    pub seed: u64,
}

impl Workload {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.keys == 0 {
            anyhow::bail!("--keys must be greater than zero");
        }
        if self.min_entry_kib < 0 || self.min_entry_kib > self.max_entry_kib {
            anyhow::bail!(
                "entry size range {}..={} KiB is empty",
                self.min_entry_kib,
                self.max_entry_kib
            );
        }
        if u16::from(self.doom_percent) + u16::from(self.write_percent) > 100 {
            anyhow::bail!("--doom-percent and --write-percent add up to more than 100");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkloadOutcome {
    pub ops: usize,
    pub hits: usize,
    pub misses: usize,
    pub creates: usize,
    /// Misses on a key whose data had been evicted
    pub refetches: usize,
    pub writes: usize,
    pub dooms: usize,
    pub doom_misses: usize,
    pub errors: usize,
}

impl WorkloadOutcome {
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub workload: WorkloadOutcome,
    pub hit_rate: f64,
    pub cache: CacheReport,
}

/// Replays `workload` against `cache`. Popular keys sit at the low indexes.
pub async fn run_workload<C>(cache: &SharedCache<C>, workload: &Workload) -> WorkloadOutcome
where
    C: Clock + Clone + Send + Sync + 'static,
{
    let mut rng = fastrand::Rng::with_seed(workload.seed);
    let mut outcome = WorkloadOutcome::default();

    for op in 0..workload.ops {
        let skew = rng.f64();
        let index = ((skew * skew) * workload.keys as f64) as usize;
        let key = format!("object-{}", index.min(workload.keys - 1));
        let size = rng.i64(workload.min_entry_kib..=workload.max_entry_kib) * 1024;
        let roll = rng.u8(..100);

        let mut cache = cache.lock().await;
        outcome.ops += 1;

        if roll < workload.doom_percent {
            match cache.doom_entry(&key) {
                Ok(()) => outcome.dooms += 1,
                Err(CacheError::EntryNotFound(_)) => outcome.doom_misses += 1,
                Err(e) => {
                    debug!(key, error = %e, "Doom failed");
                    outcome.errors += 1;
                }
            }
            continue;
        }

        match cache.open_entry(&key) {
            Ok(_) => {
                outcome.hits += 1;
                if roll < workload.doom_percent + workload.write_percent {
                    match cache.write_entry(&key, size) {
                        Ok(()) => outcome.writes += 1,
                        Err(_) => outcome.errors += 1,
                    }
                }
            }
            Err(CacheError::EntryNotFound(_)) => {
                outcome.misses += 1;
                let tombstone = cache.store().find(&key).is_some();
                match cache.create_entry(&key, size) {
                    Ok(_) => {
                        outcome.creates += 1;
                        if tombstone {
                            outcome.refetches += 1;
                        }
                    }
                    Err(e) => {
                        debug!(key, error = %e, "Create failed");
                        outcome.errors += 1;
                    }
                }
            }
            Err(e) => {
                debug!(key, error = %e, "Open failed");
                outcome.errors += 1;
            }
        }

        drop(cache);
        if op % 256 == 0 {
            tokio::task::yield_now().await;
        }
    }

    outcome
}
