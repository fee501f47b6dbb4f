use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Deadline-ordered timer queue for the single-threaded simulation timeline.
/// Every wait in the engine (cooldowns, stuns, decays, toggles, decision
/// loops) is a deferred entry here rather than a synchronous sleep. Entries
/// with equal deadlines fire in insertion order. Cancellation is handled by
/// the callers' generation counters: a stale entry still fires but its
/// handler is an idempotent no-op.
#[derive(Clone, Debug)]
pub struct Scheduler<K> {
    heap: BinaryHeap<Entry<K>>,
    seq: u64,
}

#[derive(Clone, Debug)]
struct Entry<K> {
    due_ms: u64,
    seq: u64,
    kind: K,
}

impl<K> PartialEq for Entry<K> {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl<K> Eq for Entry<K> {}

impl<K> PartialOrd for Entry<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Entry<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert so the earliest deadline wins.
        (other.due_ms, other.seq).cmp(&(self.due_ms, self.seq))
    }
}

impl<K> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            seq: 0,
        }
    }

    pub fn schedule(&mut self, due_ms: u64, kind: K) {
        let seq = self.seq;
        self.seq += 1;
        self.heap.push(Entry { due_ms, seq, kind });
    }

    /// Next timer with `due_ms <= now_ms`, earliest first.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<K> {
        if self.heap.peek().map(|e| e.due_ms <= now_ms).unwrap_or(false) {
            self.heap.pop().map(|e| e.kind)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
