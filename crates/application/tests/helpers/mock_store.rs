#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use ferrous_cache_application::ports::{
    Clock, EntryStore, EvictionTask, RankedLists, TaskScheduler,
};
use ferrous_cache_domain::{
    CacheAddr, CacheEntry, EntryInfo, EntryState, Experiment, IndexHeader, RankList,
    RankingsNode,
};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

pub const MIB: i64 = 1024 * 1024;

// ============================================================================
// Fixed clock
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    instant: Instant,
}

impl FixedClock {
    pub fn new() -> Self {
        Self {
            now: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            instant: Instant::now(),
        }
    }

    pub fn hours_ago(&self, hours: i64) -> DateTime<Utc> {
        self.now - chrono::Duration::hours(hours)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn instant(&self) -> Instant {
        self.instant
    }
}

// ============================================================================
// Mock TaskScheduler
// ============================================================================

#[derive(Debug, Default)]
pub struct MockScheduler {
    pub posted: Vec<(EvictionTask, Option<Duration>)>,
    pub revoked: u32,
}

impl MockScheduler {
    pub fn tasks(&self) -> Vec<EvictionTask> {
        self.posted.iter().map(|(task, _)| *task).collect()
    }
}

impl TaskScheduler for MockScheduler {
    fn post(&mut self, task: EvictionTask) {
        self.posted.push((task, None));
    }

    fn post_delayed(&mut self, task: EvictionTask, delay: Duration) {
        self.posted.push((task, Some(delay)));
    }

    fn revoke_all(&mut self) {
        self.posted.clear();
        self.revoked += 1;
    }
}

// ============================================================================
// Mock RankedLists
// ============================================================================

/// Lists kept as vectors, head at index 0.
#[derive(Debug, Default)]
pub struct MockRankings {
    lists: [Vec<CacheAddr>; 4],
    data: HashMap<CacheAddr, RankingsNode>,
    tracked: HashSet<CacheAddr>,
    invalidated: HashSet<CacheAddr>,
    now: Option<DateTime<Utc>>,
}

impl MockRankings {
    pub fn keys(&self, list: RankList) -> Vec<CacheAddr> {
        self.lists[list.index()].clone()
    }

    pub fn list_of(&self, node: CacheAddr) -> Option<RankList> {
        RankList::ALL
            .into_iter()
            .find(|list| self.lists[list.index()].contains(&node))
    }

    pub fn tracked(&self) -> usize {
        self.tracked.len()
    }
}

impl RankedLists for MockRankings {
    fn prev(&self, node: Option<CacheAddr>, list: RankList) -> Option<CacheAddr> {
        let nodes = &self.lists[list.index()];
        match node {
            None => nodes.last().copied(),
            Some(node) => {
                let pos = nodes.iter().position(|n| *n == node)?;
                pos.checked_sub(1).map(|p| nodes[p])
            }
        }
    }

    fn insert(&mut self, node: CacheAddr, at_front: bool, list: RankList) {
        assert_eq!(self.list_of(node), None, "{node} inserted twice");
        let nodes = &mut self.lists[list.index()];
        if at_front {
            nodes.insert(0, node);
        } else {
            nodes.push(node);
        }
    }

    fn remove(&mut self, node: CacheAddr, list: RankList) {
        let nodes = &mut self.lists[list.index()];
        let before = nodes.len();
        nodes.retain(|n| *n != node);
        assert_eq!(nodes.len() + 1, before, "{node} not on {list}");
        if self.tracked.contains(&node) {
            self.invalidated.insert(node);
        }
    }

    fn update_rank(&mut self, node: CacheAddr, modified: bool, list: RankList) {
        self.remove(node, list);
        self.insert(node, true, list);
        if let (Some(data), Some(now)) = (self.data.get_mut(&node), self.now) {
            data.last_used = now;
            if modified {
                data.last_modified = now;
            }
        }
    }

    fn track(&mut self, node: CacheAddr, track: bool) {
        if track {
            self.tracked.insert(node);
        } else {
            self.tracked.remove(&node);
            self.invalidated.remove(&node);
        }
    }

    fn node_data(&self, node: CacheAddr) -> Option<RankingsNode> {
        if self.invalidated.contains(&node) {
            return None;
        }
        self.data.get(&node).copied()
    }

    fn size(&self, list: RankList) -> i32 {
        self.lists[list.index()].len() as i32
    }
}

// ============================================================================
// Mock EntryStore
// ============================================================================

pub struct MockStore {
    pub rankings: MockRankings,
    pub entries: HashMap<CacheAddr, (EntryInfo, i64)>,
    pub header: IndexHeader,
    pub max_size: i64,
    pub loaded: bool,
    pub disabled: bool,
    pub doomed: Vec<CacheAddr>,
    pub released: usize,
    pub first_evictions: u32,
    next_addr: u32,
}

impl MockStore {
    pub fn new(new_eviction: bool, max_size: i64) -> Self {
        let mut header = IndexHeader::new(new_eviction, Experiment::None);
        header.create_time = Some(FixedClock::new().now());
        let mut rankings = MockRankings::default();
        rankings.now = Some(FixedClock::new().now());

        Self {
            rankings,
            entries: HashMap::new(),
            header,
            max_size,
            loaded: false,
            disabled: false,
            doomed: Vec::new(),
            released: 0,
            first_evictions: 0,
            next_addr: 1,
        }
    }

    /// Adds a record without linking it.
    pub fn add_record(&mut self, info: EntryInfo, size: i64, last_used: DateTime<Utc>) -> CacheEntry {
        let addr = CacheAddr::new(self.next_addr);
        self.next_addr += 1;

        let mut node = RankingsNode::new(last_used);
        node.last_modified = last_used;
        self.rankings.data.insert(addr, node);
        self.entries.insert(addr, (info, size));
        self.header.num_entries += 1;
        self.header.num_bytes += size;
        CacheEntry::new(addr, info)
    }

    /// Adds a record and links it at the head of `list`.
    pub fn add(&mut self, info: EntryInfo, size: i64, list: RankList, last_used: DateTime<Utc>) -> CacheAddr {
        let entry = self.add_record(info, size, last_used);
        self.rankings.insert(entry.rankings, true, list);
        entry.rankings
    }

    /// Links a node that has no record behind it.
    pub fn add_orphan_node(&mut self, list: RankList, last_used: DateTime<Utc>) -> CacheAddr {
        let addr = CacheAddr::new(self.next_addr);
        self.next_addr += 1;
        self.rankings.data.insert(addr, RankingsNode::new(last_used));
        self.rankings.insert(addr, true, list);
        addr
    }

    pub fn info(&self, addr: CacheAddr) -> Option<EntryInfo> {
        self.entries.get(&addr).map(|(info, _)| *info)
    }

    pub fn entry(&self, addr: CacheAddr) -> CacheEntry {
        CacheEntry::new(addr, self.info(addr).unwrap())
    }

    pub fn set_dirty(&mut self, addr: CacheAddr, dirty: u32) {
        if let Some(node) = self.rankings.data.get_mut(&addr) {
            node.dirty = dirty;
        }
    }
}

impl EntryStore for MockStore {
    type Rankings = MockRankings;

    fn rankings(&self) -> &MockRankings {
        &self.rankings
    }

    fn rankings_mut(&mut self) -> &mut MockRankings {
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
        7
    }

    fn resolve(&mut self, node: CacheAddr) -> Option<CacheEntry> {
        self.entries
            .get(&node)
            .map(|(info, _)| CacheEntry::new(node, *info))
    }

    fn persist(&mut self, entry: &CacheEntry) {
        if let Some((info, _)) = self.entries.get_mut(&entry.rankings) {
            *info = entry.info;
        }
    }

    fn doom(&mut self, entry: &CacheEntry) {
        assert_eq!(
            self.rankings.list_of(entry.rankings),
            None,
            "{} doomed while still linked",
            entry.rankings
        );
        if let Some((_, size)) = self.entries.remove(&entry.rankings) {
            self.header.num_entries -= 1;
            self.header.num_bytes -= size;
        }
        self.doomed.push(entry.rankings);
    }

    fn delete_data_only(&mut self, entry: &CacheEntry) {
        if let Some((_, size)) = self.entries.get_mut(&entry.rankings) {
            self.header.num_bytes -= *size;
            *size = 0;
        }
    }

    fn release(&mut self, _entry: CacheEntry) {
        self.released += 1;
    }

    fn on_first_eviction(&mut self) {
        self.first_evictions += 1;
    }
}

pub fn live(reuse_count: i32) -> EntryInfo {
    EntryInfo {
        reuse_count,
        refetch_count: 0,
        state: EntryState::Normal,
    }
}

pub fn evicted(reuse_count: i32, refetch_count: i32) -> EntryInfo {
    EntryInfo {
        reuse_count,
        refetch_count,
        state: EntryState::Evicted,
    }
}
