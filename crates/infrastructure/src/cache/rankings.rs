//! In-memory ranked lists
//!
//! One doubly linked list per `RankList`, threaded through a single node
//! arena keyed by `CacheAddr`. Heads hold the most recently used nodes; the
//! eviction walks start at the tails.

use ferrous_cache_application::ports::{Clock, RankedLists};
use ferrous_cache_domain::{CacheAddr, RankList, RankingsNode};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::error;

#[derive(Debug)]
struct Node {
    /// Towards the head.
    prev: Option<CacheAddr>,
    /// Towards the tail.
    next: Option<CacheAddr>,
    list: Option<RankList>,
    data: RankingsNode,
}

pub struct MemoryRankings<C> {
    clock: C,
    nodes: FxHashMap<CacheAddr, Node>,
    heads: [Option<CacheAddr>; 4],
    tails: [Option<CacheAddr>; 4],
    sizes: [i32; 4],
    tracked: FxHashSet<CacheAddr>,
    invalidated: FxHashSet<CacheAddr>,
    next_addr: u32,
}

impl<C: Clock> MemoryRankings<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            nodes: FxHashMap::default(),
            heads: [None; 4],
            tails: [None; 4],
            sizes: [0; 4],
            tracked: FxHashSet::default(),
            invalidated: FxHashSet::default(),
            next_addr: 1,
        }
    }

    /// Creates an unlinked node stamped with the current time.
    pub fn allocate(&mut self) -> CacheAddr {
        let addr = CacheAddr::new(self.next_addr);
        self.next_addr += 1;
        self.nodes.insert(
            addr,
            Node {
                prev: None,
                next: None,
                list: None,
                data: RankingsNode::new(self.clock.now()),
            },
        );
        addr
    }

    /// Releases an unlinked node.
    pub fn free(&mut self, addr: CacheAddr) {
        if let Some(list) = self.list_of(addr) {
            corrupted(addr, "freeing a node that is still linked", Some(list));
            self.unlink(addr, list);
        }
        self.nodes.remove(&addr);
        self.tracked.remove(&addr);
        self.invalidated.remove(&addr);
    }

    pub fn list_of(&self, addr: CacheAddr) -> Option<RankList> {
        self.nodes.get(&addr).and_then(|node| node.list)
    }

    /// Nodes of `list`, head first.
    pub fn iter(&self, list: RankList) -> Vec<CacheAddr> {
        let mut out = Vec::with_capacity(self.sizes[list.index()].max(0) as usize);
        let mut cursor = self.heads[list.index()];
        while let Some(addr) = cursor {
            out.push(addr);
            cursor = self.nodes.get(&addr).and_then(|node| node.next);
        }
        out
    }

    pub fn set_dirty(&mut self, addr: CacheAddr, dirty: u32) {
        if let Some(node) = self.nodes.get_mut(&addr) {
            node.data.dirty = dirty;
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn link_front(&mut self, addr: CacheAddr, list: RankList) {
        let index = list.index();
        let old_head = self.heads[index];
        if let Some(node) = self.nodes.get_mut(&addr) {
            node.prev = None;
            node.next = old_head;
            node.list = Some(list);
        }
        match old_head {
            Some(head) => {
                if let Some(node) = self.nodes.get_mut(&head) {
                    node.prev = Some(addr);
                }
            }
            None => self.tails[index] = Some(addr),
        }
        self.heads[index] = Some(addr);
        self.sizes[index] += 1;
    }

    fn link_back(&mut self, addr: CacheAddr, list: RankList) {
        let index = list.index();
        let old_tail = self.tails[index];
        if let Some(node) = self.nodes.get_mut(&addr) {
            node.prev = old_tail;
            node.next = None;
            node.list = Some(list);
        }
        match old_tail {
            Some(tail) => {
                if let Some(node) = self.nodes.get_mut(&tail) {
                    node.next = Some(addr);
                }
            }
            None => self.heads[index] = Some(addr),
        }
        self.tails[index] = Some(addr);
        self.sizes[index] += 1;
    }

    fn unlink(&mut self, addr: CacheAddr, list: RankList) {
        let index = list.index();
        let Some(node) = self.nodes.get_mut(&addr) else {
            return;
        };
        let (prev, next) = (node.prev.take(), node.next.take());
        node.list = None;

        match prev {
            Some(prev) => {
                if let Some(node) = self.nodes.get_mut(&prev) {
                    node.next = next;
                }
            }
            None => self.heads[index] = next,
        }
        match next {
            Some(next) => {
                if let Some(node) = self.nodes.get_mut(&next) {
                    node.prev = prev;
                }
            }
            None => self.tails[index] = prev,
        }
        self.sizes[index] -= 1;
    }
}

impl<C: Clock> RankedLists for MemoryRankings<C> {
    fn prev(&self, node: Option<CacheAddr>, list: RankList) -> Option<CacheAddr> {
        match node {
            None => self.tails[list.index()],
            Some(addr) => {
                let node = self.nodes.get(&addr)?;
                if node.list != Some(list) {
                    return None;
                }
                node.prev
            }
        }
    }

    fn insert(&mut self, node: CacheAddr, at_front: bool, list: RankList) {
        match self.nodes.get(&node).map(|n| n.list) {
            None => return corrupted(node, "inserting an unknown node", Some(list)),
            Some(Some(current)) => {
                return corrupted(node, "inserting a node that is already linked", Some(current))
            }
            Some(None) => {}
        }

        if at_front {
            self.link_front(node, list);
        } else {
            self.link_back(node, list);
        }
    }

    fn remove(&mut self, node: CacheAddr, list: RankList) {
        if self.list_of(node) != Some(list) {
            return corrupted(node, "removing a node from a list it is not on", Some(list));
        }

        self.unlink(node, list);
        if self.tracked.contains(&node) {
            self.invalidated.insert(node);
        }
    }

    fn update_rank(&mut self, node: CacheAddr, modified: bool, list: RankList) {
        if self.list_of(node) != Some(list) {
            return corrupted(node, "updating the rank of a node on another list", Some(list));
        }

        let now = self.clock.now();
        self.unlink(node, list);
        self.link_front(node, list);
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.data.last_used = now;
            if modified {
                entry.data.last_modified = now;
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
        self.nodes.get(&node).map(|n| n.data)
    }

    fn size(&self, list: RankList) -> i32 {
        self.sizes[list.index()]
    }
}

#[cold]
fn corrupted(addr: CacheAddr, message: &'static str, list: Option<RankList>) {
    error!(%addr, list = ?list, "Rankings corrupted: {message}");
    debug_assert!(false, "{message} ({addr})");
}
