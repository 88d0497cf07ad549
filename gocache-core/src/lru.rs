//! Byte-budgeted LRU store.
//!
//! A single arena of slots plus an intrusive doubly-linked list (indices, not
//! pointers) gives O(1) `get`/`add`/`remove_oldest` without unsafe code.
//! There is exactly one `LruStore` per cache `Group`, so sharding it across
//! locks would only add contention it doesn't need to pay for.
//!
//! A `max_bytes` of `0` means unbounded, matching the Go original's
//! `New(int64(0), nil)` convention — eviction never runs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A single key/value slot in the arena.
struct Node {
    // Shared with the map's key so inserting never duplicates the buffer.
    key: Arc<[u8]>,
    value: super::byteview::ByteView,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Node {
    fn size(&self) -> usize {
        self.key.len() + self.value.len()
    }
}

/// LRU cache ordered by recency, bounded by total key+value bytes.
///
/// `on_evict`, when set, is invoked once per evicted entry, in eviction
/// order, before `add` returns.
pub struct LruStore {
    max_bytes: usize,
    used_bytes: usize,
    map: HashMap<Arc<[u8]>, usize>,
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evict: Option<Box<dyn FnMut(&[u8], &super::byteview::ByteView) + Send>>,
}

impl fmt::Debug for LruStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruStore")
            .field("max_bytes", &self.max_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.map.len())
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}

impl LruStore {
    /// Creates an empty store with the given byte budget (`0` = unbounded).
    pub fn new(max_bytes: usize) -> Self {
        LruStore {
            max_bytes,
            used_bytes: 0,
            map: HashMap::new(),
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            on_evict: None,
        }
    }

    /// Registers a callback invoked with the key and value of each evicted
    /// entry, in eviction order.
    pub fn set_on_evict<F>(&mut self, callback: F)
    where
        F: FnMut(&[u8], &super::byteview::ByteView) + Send + 'static,
    {
        self.on_evict = Some(Box::new(callback));
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total bytes currently accounted for (sum of key len + value len).
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Configured byte budget (`0` means unbounded).
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Looks up `key`, marking it most-recently-used on a hit.
    pub fn get(&mut self, key: &[u8]) -> Option<super::byteview::ByteView> {
        let idx = *self.map.get(key)?;
        self.touch(idx);
        self.nodes[idx].as_ref().map(|node| node.value.clone())
    }

    /// Inserts or updates `key`, then evicts least-recently-used entries
    /// until the store is back within budget.
    ///
    /// A single value larger than the whole budget is still inserted; the
    /// very next eviction pass (here, or on the next `add`) removes it
    /// again, since it is by construction the sole and therefore oldest
    /// entry once everything else has been evicted.
    pub fn add(&mut self, key: &[u8], value: super::byteview::ByteView) {
        if let Some(&idx) = self.map.get(key) {
            self.touch(idx);
            let node = self.nodes[idx].as_mut().expect("node exists");
            let old_size = node.size();
            node.value = value;
            let new_size = node.key.len() + node.value.len();
            self.used_bytes = self.used_bytes - old_size + new_size;
        } else {
            let size = key.len() + value.len();
            let shared_key: Arc<[u8]> = Arc::from(key);
            self.insert_new(shared_key, value);
            self.used_bytes += size;
        }

        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            if !self.remove_oldest() {
                break;
            }
        }
    }

    /// Evicts the single least-recently-used entry, if any.
    ///
    /// Returns `false` when the store was already empty.
    pub fn remove_oldest(&mut self) -> bool {
        let Some(idx) = self.head else {
            return false;
        };
        self.remove_idx(idx);
        true
    }

    fn touch(&mut self, idx: usize) {
        if self.tail == Some(idx) {
            return;
        }
        self.detach(idx);
        self.push_back(idx);
    }

    fn insert_new(&mut self, key: Arc<[u8]>, value: super::byteview::ByteView) -> usize {
        let idx = self.free.pop().unwrap_or_else(|| {
            self.nodes.push(None);
            self.nodes.len() - 1
        });

        self.nodes[idx] = Some(Node {
            key: Arc::clone(&key),
            value,
            prev: None,
            next: None,
        });
        self.push_back(idx);
        self.map.insert(key, idx);
        idx
    }

    fn remove_idx(&mut self, idx: usize) {
        self.detach(idx);
        let node = self.nodes[idx].take().expect("node exists");
        self.used_bytes -= node.key.len() + node.value.len();
        self.map.remove(node.key.as_ref());
        self.free.push(idx);

        if let Some(callback) = self.on_evict.as_mut() {
            callback(&node.key, &node.value);
        }
    }

    fn detach(&mut self, idx: usize) {
        let (prev, next) = {
            let node = self.nodes[idx].as_ref().expect("node exists");
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.nodes[p].as_mut().expect("node exists").next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].as_mut().expect("node exists").prev = prev,
            None => self.tail = prev,
        }

        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    fn push_back(&mut self, idx: usize) {
        let tail = self.tail;
        if let Some(node) = self.nodes[idx].as_mut() {
            node.prev = tail;
            node.next = None;
        }

        match tail {
            Some(t) => self.nodes[t].as_mut().expect("node exists").next = Some(idx),
            None => self.head = Some(idx),
        }
        self.tail = Some(idx);
    }
}
