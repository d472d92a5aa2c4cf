use super::scheduler::TaskQueue;
use super::store::MemoryStore;
use ferrous_cache_application::ports::{Clock, EntryStore};
use ferrous_cache_application::services::{EvictionMetrics, EvictionPolicy, ListStats};
use ferrous_cache_domain::config::CacheConfig;
use ferrous_cache_domain::{CacheAddr, CacheEntry, CacheError, EntryState};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Cache backend: the in-memory store driven by the eviction policy.
///
/// Every lifecycle operation runs the matching eviction hook, and any size
/// change that leaves the store above its maximum starts a trim. Deferred
/// eviction work is queued and only runs from `run_pending_tasks`.
pub struct DiskCache<C: Clock + Clone> {
    store: MemoryStore<C>,
    eviction: EvictionPolicy<TaskQueue<C>, C>,
}

impl<C: Clock + Clone> DiskCache<C> {
    pub fn new(config: &CacheConfig, clock: C) -> Self {
        let store = MemoryStore::new(config, clock.clone());
        let mut eviction = EvictionPolicy::new(TaskQueue::new(clock.clone()), clock);
        eviction.init(&store);

        info!(
            max_size = config.max_size,
            new_eviction = config.new_eviction,
            deleted_list_experiment = config.deleted_list_experiment,
            "Disk cache initialized"
        );

        Self { store, eviction }
    }

    /// Stores a new entry, or brings back one whose data was evicted.
    pub fn create_entry(&mut self, key: &str, data_size: i64) -> Result<CacheAddr, CacheError> {
        if self.store.is_disabled() {
            return Err(CacheError::Disabled);
        }

        let mut entry = match self.store.find(key) {
            Some(addr) => {
                let entry = self.resolve(addr)?;
                match entry.state() {
                    EntryState::Evicted => {
                        self.store.set_data_size(addr, data_size)?;
                        entry
                    }
                    EntryState::Normal => return Err(CacheError::EntryExists(key.to_string())),
                    state => return Err(CacheError::InvalidState { addr, state }),
                }
            }
            None => self.store.add_entry(key, data_size)?,
        };

        let addr = entry.rankings;
        self.eviction.on_create_entry(&mut self.store, &mut entry);
        self.store.release(entry);
        self.check_storage_size();
        Ok(addr)
    }

    /// Looks up a live entry. Tombstones count as misses.
    pub fn open_entry(&mut self, key: &str) -> Result<CacheAddr, CacheError> {
        let mut entry = self.live_entry(key)?;
        let addr = entry.rankings;

        self.eviction.on_open_entry(&mut self.store, &mut entry);
        self.eviction.update_rank(&mut self.store, &entry, false);
        self.store.release(entry);
        Ok(addr)
    }

    /// Replaces the data of a live entry.
    pub fn write_entry(&mut self, key: &str, data_size: i64) -> Result<(), CacheError> {
        let entry = self.live_entry(key)?;

        self.store.set_data_size(entry.rankings, data_size)?;
        self.eviction.update_rank(&mut self.store, &entry, true);
        self.store.release(entry);
        self.check_storage_size();
        Ok(())
    }

    /// Pins a live entry against eviction while it is being written.
    pub fn begin_write(&mut self, key: &str) -> Result<(), CacheError> {
        let entry = self.live_entry(key)?;
        self.store.begin_write(entry.rankings);
        Ok(())
    }

    pub fn end_write(&mut self, key: &str) -> Result<(), CacheError> {
        let entry = self.live_entry(key)?;
        self.store.end_write(entry.rankings);
        Ok(())
    }

    /// Invalidates a live entry and releases its storage.
    pub fn doom_entry(&mut self, key: &str) -> Result<(), CacheError> {
        let entry = self.live_entry(key)?;
        debug!(key, addr = %entry.rankings, "Dooming entry");
        self.eviction.doom_entry(&mut self.store, entry);
        Ok(())
    }

    /// Trims towards the target size, as capacity accounting would.
    pub fn trim(&mut self) {
        self.eviction.trim_cache(&mut self.store, false);
    }

    /// Removes every entry and tombstone.
    pub fn clear(&mut self) {
        self.eviction.trim_cache(&mut self.store, true);
    }

    /// Single-step mode for tests: each trim evicts one entry and no
    /// follow-up work is scheduled.
    pub fn set_test_mode(&mut self) {
        self.eviction.set_test_mode();
    }

    /// Runs a tombstone trim directly. Tiered mode under test mode only.
    pub fn trim_deleted_list(&mut self, empty: bool) {
        self.eviction.trim_deleted_list(&mut self.store, empty);
    }

    /// Runs every deferred eviction task that is due. Continuations posted
    /// while draining run in the same call when they are due immediately.
    pub fn run_pending_tasks(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.eviction.scheduler_mut().pop_due() {
            self.eviction.run_task(&mut self.store, task);
            ran += 1;
        }
        ran
    }

    pub fn pending_tasks(&self) -> usize {
        self.eviction.scheduler().len()
    }

    pub fn next_task_deadline(&self) -> Option<Instant> {
        self.eviction.scheduler().next_deadline()
    }

    /// Permanently stops eviction. Called when the backend shuts down.
    pub fn stop(&mut self) {
        self.eviction.stop();
    }

    pub fn store(&self) -> &MemoryStore<C> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MemoryStore<C> {
        &mut self.store
    }

    pub fn eviction(&self) -> &EvictionPolicy<TaskQueue<C>, C> {
        &self.eviction
    }

    pub fn eviction_mut(&mut self) -> &mut EvictionPolicy<TaskQueue<C>, C> {
        &mut self.eviction
    }

    pub fn metrics(&self) -> Arc<EvictionMetrics> {
        self.eviction.metrics()
    }

    pub fn list_stats(&self) -> ListStats {
        self.eviction.list_stats(&self.store)
    }

    pub fn max_size(&self) -> i64 {
        self.store.max_size()
    }

    pub fn total_bytes(&self) -> i64 {
        self.store.total_bytes()
    }

    pub fn entry_count(&self) -> i32 {
        self.store.entry_count()
    }

    fn resolve(&mut self, addr: CacheAddr) -> Result<CacheEntry, CacheError> {
        self.store
            .resolve(addr)
            .ok_or(CacheError::AddressNotFound(addr))
    }

    fn live_entry(&mut self, key: &str) -> Result<CacheEntry, CacheError> {
        let addr = self
            .store
            .find(key)
            .ok_or_else(|| CacheError::EntryNotFound(key.to_string()))?;
        let entry = self.resolve(addr)?;
        if entry.state() != EntryState::Normal {
            return Err(CacheError::EntryNotFound(key.to_string()));
        }
        Ok(entry)
    }

    fn check_storage_size(&mut self) {
        if self.store.total_bytes() > self.store.max_size() {
            self.eviction.trim_cache(&mut self.store, false);
        }
    }
}
