use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use super::types::Item;

/// Bounded in-process tier
///
/// Entries are ordered by insertion (newest at the head) and evicted from the
/// tail once the summed [`Item::size`] would reach the memory limit. Reads do
/// not change the order, so eviction is oldest-inserted first rather than LRU.
pub struct LocalCache {
    inner: Mutex<LocalState>,
    memory_limit: u64,
}

struct LocalState {
    /// Insertion sequence -> item; the highest sequence is the head
    order: BTreeMap<u64, Arc<Item>>,
    /// Key -> insertion sequence in `order`
    index: HashMap<String, u64>,
    next_seq: u64,
    total_size: u64,
    evictions: u64,
}

impl LocalState {
    fn unlink(&mut self, key: &str) -> Option<Arc<Item>> {
        let seq = self.index.remove(key)?;
        let item = self.order.remove(&seq)?;
        self.total_size = self.total_size.saturating_sub(item.size());
        Some(item)
    }
}

/// Local tier counters
#[derive(Debug, Clone, Default)]
pub struct LocalStats {
    pub entries: usize,
    pub total_bytes: u64,
    pub memory_limit: u64,
    pub evictions: u64,
}

impl LocalCache {
    pub fn new(memory_limit: u64) -> Self {
        Self {
            inner: Mutex::new(LocalState {
                order: BTreeMap::new(),
                index: HashMap::new(),
                next_seq: 0,
                total_size: 0,
                evictions: 0,
            }),
            memory_limit,
        }
    }

    /// Find an entry without touching its position
    pub fn lookup(&self, key: &str) -> Option<Arc<Item>> {
        let state = self.inner.lock();
        let seq = state.index.get(key)?;
        state.order.get(seq).cloned()
    }

    /// Insert a new entry at the head, evicting from the tail first.
    ///
    /// Always succeeds: an item larger than the whole limit is stored once the
    /// cache has been emptied.
    pub fn insert(&self, key: &str, version: i64, payload: Vec<u8>) -> Arc<Item> {
        let item = Arc::new(Item::new(key, version, payload));
        let new_size = item.size();

        let mut state = self.inner.lock();

        // A replaced key must not leave an orphan behind in `order`
        state.unlink(key);

        while state.total_size + new_size >= self.memory_limit {
            let Some((_, evicted)) = state.order.pop_first() else {
                break;
            };
            state.index.remove(&evicted.key);
            state.total_size = state.total_size.saturating_sub(evicted.size());
            state.evictions += 1;
            debug!(
                "Local cache EVICT key={} ver={} size={} age={:?}",
                evicted.key,
                evicted.version,
                evicted.size(),
                evicted.age()
            );
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.order.insert(seq, item.clone());
        state.index.insert(key.to_string(), seq);
        state.total_size += new_size;

        item
    }

    /// Remove an entry; no-op when absent
    pub fn remove(&self, key: &str) -> Option<Arc<Item>> {
        self.inner.lock().unlink(key)
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut state = self.inner.lock();
        let count = state.order.len();
        state.order.clear();
        state.index.clear();
        state.total_size = 0;
        debug!("Local cache CLEAR ({} entries)", count);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_size(&self) -> u64 {
        self.inner.lock().total_size
    }

    pub fn memory_limit(&self) -> u64 {
        self.memory_limit
    }

    pub fn evictions(&self) -> u64 {
        self.inner.lock().evictions
    }

    pub fn stats(&self) -> LocalStats {
        let state = self.inner.lock();
        LocalStats {
            entries: state.order.len(),
            total_bytes: state.total_size,
            memory_limit: self.memory_limit,
            evictions: state.evictions,
        }
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        let state = self.inner.lock();
        assert_eq!(state.order.len(), state.index.len());
        for (key, seq) in &state.index {
            assert_eq!(&state.order[seq].key, key);
        }
        let summed: u64 = state.order.values().map(|item| item.size()).sum();
        assert_eq!(summed, state.total_size);
    }
}
