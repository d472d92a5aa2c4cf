use super::rankings::MemoryRankings;
use compact_str::CompactString;
use ferrous_cache_application::ports::{Clock, EntryStore, RankedLists};
use ferrous_cache_domain::config::CacheConfig;
use ferrous_cache_domain::{
    CacheAddr, CacheEntry, CacheError, EntryInfo, EntryState, IndexHeader, RankList,
};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct EntryRecord {
    key: CompactString,
    info: EntryInfo,
    data_size: i64,
}

/// In-memory backing store: entry records, key index and header accounting.
///
/// `num_bytes` counts live data only; `num_entries` counts every record,
/// tombstones included.
pub struct MemoryStore<C> {
    rankings: MemoryRankings<C>,
    records: FxHashMap<CacheAddr, EntryRecord>,
    keys: FxHashMap<CompactString, CacheAddr>,
    header: IndexHeader,
    max_size: i64,
    disabled: bool,
    loaded: bool,
    current_entry_id: u32,
    first_evictions: u32,
}

impl<C: Clock> MemoryStore<C> {
    pub fn new(config: &CacheConfig, clock: C) -> Self {
        let mut header = IndexHeader::new(config.new_eviction, config.experiment());
        header.create_time = Some(clock.now());

        Self {
            rankings: MemoryRankings::new(clock),
            records: FxHashMap::default(),
            keys: FxHashMap::default(),
            header,
            max_size: config.max_size,
            disabled: false,
            loaded: false,
            current_entry_id: 1,
            first_evictions: 0,
        }
    }

    /// Creates the record for a new key. The caller links it into a list.
    pub fn add_entry(&mut self, key: &str, data_size: i64) -> Result<CacheEntry, CacheError> {
        if self.disabled {
            return Err(CacheError::Disabled);
        }
        if self.keys.contains_key(key) {
            return Err(CacheError::EntryExists(key.to_string()));
        }

        let addr = self.rankings.allocate();
        let info = EntryInfo::default();
        self.records.insert(
            addr,
            EntryRecord {
                key: CompactString::from(key),
                info,
                data_size,
            },
        );
        self.keys.insert(CompactString::from(key), addr);
        self.header.num_entries += 1;
        self.header.num_bytes += data_size;

        debug!(key, %addr, data_size, "Entry record created");
        Ok(CacheEntry::new(addr, info))
    }

    pub fn find(&self, key: &str) -> Option<CacheAddr> {
        self.keys.get(key).copied()
    }

    pub fn key_of(&self, addr: CacheAddr) -> Option<&str> {
        self.records.get(&addr).map(|r| r.key.as_str())
    }

    pub fn info(&self, addr: CacheAddr) -> Option<EntryInfo> {
        self.records.get(&addr).map(|r| r.info)
    }

    pub fn data_size(&self, addr: CacheAddr) -> Option<i64> {
        self.records.get(&addr).map(|r| r.data_size)
    }

    /// Replaces the data stored for the entry at `addr`.
    pub fn set_data_size(&mut self, addr: CacheAddr, data_size: i64) -> Result<(), CacheError> {
        let record = self
            .records
            .get_mut(&addr)
            .ok_or(CacheError::AddressNotFound(addr))?;
        self.header.num_bytes += data_size - record.data_size;
        record.data_size = data_size;
        Ok(())
    }

    /// Marks the entry as being written by the current session.
    pub fn begin_write(&mut self, addr: CacheAddr) {
        let id = self.current_entry_id;
        self.rankings.set_dirty(addr, id);
    }

    pub fn end_write(&mut self, addr: CacheAddr) {
        self.rankings.set_dirty(addr, 0);
    }

    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn memory_rankings(&self) -> &MemoryRankings<C> {
        &self.rankings
    }

    pub fn memory_rankings_mut(&mut self) -> &mut MemoryRankings<C> {
        &mut self.rankings
    }

    pub fn entry_count(&self) -> i32 {
        self.header.num_entries
    }

    pub fn total_bytes(&self) -> i64 {
        self.header.num_bytes
    }

    pub fn first_evictions(&self) -> u32 {
        self.first_evictions
    }

    /// Lists every record whose list membership disagrees with its state.
    pub fn check_consistency(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let linked: i32 = RankList::ALL.iter().map(|&l| self.rankings.size(l)).sum();

        if linked as usize != self.records.len() {
            problems.push(format!(
                "{} records but {} linked nodes",
                self.records.len(),
                linked
            ));
        }
        if self.header.num_entries as usize != self.records.len() {
            problems.push(format!(
                "header counts {} entries, store holds {}",
                self.header.num_entries,
                self.records.len()
            ));
        }

        for (addr, record) in &self.records {
            let expected = match record.info.state {
                EntryState::Normal if self.header.new_eviction => record.info.tier(),
                EntryState::Normal => RankList::NoUse,
                EntryState::Evicted | EntryState::Doomed => RankList::Deleted,
            };
            let actual = self.rankings.list_of(*addr);
            if actual != Some(expected) {
                problems.push(format!(
                    "{} ({addr}, {}) is on {actual:?}, expected {expected}",
                    record.key, record.info.state
                ));
            }
        }
        problems
    }
}

impl<C: Clock> EntryStore for MemoryStore<C> {
    type Rankings = MemoryRankings<C>;

    fn rankings(&self) -> &Self::Rankings {
        &self.rankings
    }

    fn rankings_mut(&mut self) -> &mut Self::Rankings {
        &mut self.rankings
    }

    fn header(&self) -> &IndexHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut IndexHeader {
        &mut self.header
    }

    fn max_size(&self) -> i64 {
        self.max_size
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn current_entry_id(&self) -> u32 {
        self.current_entry_id
    }

    fn resolve(&mut self, node: CacheAddr) -> Option<CacheEntry> {
        self.records
            .get(&node)
            .map(|record| CacheEntry::new(node, record.info))
    }

    fn persist(&mut self, entry: &CacheEntry) {
        if let Some(record) = self.records.get_mut(&entry.rankings) {
            record.info = entry.info;
        }
    }

    fn doom(&mut self, entry: &CacheEntry) {
        let Some(record) = self.records.remove(&entry.rankings) else {
            return;
        };

        if self.keys.get(&record.key) == Some(&entry.rankings) {
            self.keys.remove(&record.key);
        }
        self.header.num_bytes -= record.data_size;
        self.header.num_entries -= 1;
        self.rankings.free(entry.rankings);
        debug!(key = %record.key, addr = %entry.rankings, "Entry doomed");
    }

    fn delete_data_only(&mut self, entry: &CacheEntry) {
        if let Some(record) = self.records.get_mut(&entry.rankings) {
            self.header.num_bytes -= record.data_size;
            record.data_size = 0;
        }
    }

    fn on_first_eviction(&mut self) {
        self.first_evictions += 1;
        info!(
            num_entries = self.header.num_entries,
            num_bytes = self.header.num_bytes,
            "Cache is full, first eviction"
        );
    }
}
