use ferrous_cache_application::ports::{Clock, EvictionTask, TaskScheduler};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};
use tracing::debug;

type Slot = Reverse<(Instant, u64, EvictionTask)>;

/// Deferred eviction work, ordered by deadline.
///
/// The host loop drains it with `pop_due`; tasks posted with the same
/// deadline run in posting order.
pub struct TaskQueue<C> {
    clock: C,
    heap: BinaryHeap<Slot>,
    seq: u64,
}

impl<C: Clock> TaskQueue<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// Next task whose deadline has passed.
    pub fn pop_due(&mut self) -> Option<EvictionTask> {
        let now = self.clock.instant();
        match self.heap.peek() {
            Some(Reverse((due, _, _))) if *due <= now => {
                self.heap.pop().map(|Reverse((_, _, task))| task)
            }
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse((due, _, _))| *due)
    }

    /// Pending tasks in the order they would run.
    pub fn pending(&self) -> Vec<EvictionTask> {
        let mut slots: Vec<_> = self.heap.iter().map(|Reverse(slot)| *slot).collect();
        slots.sort();
        slots.into_iter().map(|(_, _, task)| task).collect()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    fn push(&mut self, task: EvictionTask, due: Instant) {
        self.seq += 1;
        self.heap.push(Reverse((due, self.seq, task)));
    }
}

impl<C: Clock> TaskScheduler for TaskQueue<C> {
    fn post(&mut self, task: EvictionTask) {
        let now = self.clock.instant();
        self.push(task, now);
    }

    fn post_delayed(&mut self, task: EvictionTask, delay: Duration) {
        let due = self.clock.instant() + delay;
        self.push(task, due);
    }

    fn revoke_all(&mut self) {
        if !self.heap.is_empty() {
            debug!(revoked = self.heap.len(), "Revoking pending eviction tasks");
        }
        self.heap.clear();
    }
}
