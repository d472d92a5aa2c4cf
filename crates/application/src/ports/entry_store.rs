use super::rankings::RankedLists;
use ferrous_cache_domain::{CacheAddr, CacheEntry, IndexHeader};

/// Application-layer port for the backing store that owns entry records.
///
/// The eviction policy never keeps references into the store: every call
/// borrows it for the duration of one synchronous call chain. List
/// bookkeeping is the policy's job, so `doom` and `delete_data_only` must not
/// touch the ranked lists.
pub trait EntryStore {
    type Rankings: RankedLists;

    fn rankings(&self) -> &Self::Rankings;

    fn rankings_mut(&mut self) -> &mut Self::Rankings;

    fn header(&self) -> &IndexHeader;

    fn header_mut(&mut self) -> &mut IndexHeader;

    /// Configured capacity in bytes.
    fn max_size(&self) -> i64;

    fn is_disabled(&self) -> bool;

    /// Whether the store is busy enough that trimming should be postponed.
    fn is_loaded(&self) -> bool;

    /// Write generation stamped on the rankings node of entries in use.
    fn current_entry_id(&self) -> u32;

    /// Loads the entry owning the rankings node `node`.
    fn resolve(&mut self, node: CacheAddr) -> Option<CacheEntry>;

    /// Flushes the entry metadata back to the record.
    fn persist(&mut self, entry: &CacheEntry);

    /// Deletes the entry's data and its record.
    fn doom(&mut self, entry: &CacheEntry);

    /// Deletes the entry's data, keeping the record.
    fn delete_data_only(&mut self, entry: &CacheEntry);

    /// Drops the pin taken by `resolve`.
    fn release(&mut self, _entry: CacheEntry) {}

    /// Called once when a full cache is trimmed for the first time.
    fn on_first_eviction(&mut self) {}
}
