use ferrous_cache_domain::{CacheAddr, RankList, RankingsNode};

/// Application-layer port for the ranked lists of the cache index.
///
/// Every entry record owns one rankings node; the node is linked into at most
/// one list at a time. The lists are ordered most-recently-used first, so the
/// eviction walks start at the tail and move towards the head with `prev`.
pub trait RankedLists {
    /// The node before `node` in `list`, or the tail when `node` is `None`.
    fn prev(&self, node: Option<CacheAddr>, list: RankList) -> Option<CacheAddr>;

    /// Links `node` into `list`.
    fn insert(&mut self, node: CacheAddr, at_front: bool, list: RankList);

    /// Unlinks `node` from `list`.
    fn remove(&mut self, node: CacheAddr, list: RankList);

    /// Moves `node` to the front of `list`, refreshing its last-used time.
    /// `modified` also refreshes the last-modified time and flags the node
    /// for persistence.
    fn update_rank(&mut self, node: CacheAddr, modified: bool, list: RankList);

    /// Marks `node` as held by an iterator. A tracked node removed from its
    /// list loses its data until it is untracked.
    fn track(&mut self, node: CacheAddr, track: bool);

    /// The node payload, or `None` when the node has no valid data.
    fn node_data(&self, node: CacheAddr) -> Option<RankingsNode>;

    /// Number of nodes linked into `list`.
    fn size(&self, list: RankList) -> i32;
}
