//! Thread-safe wrapper around a single [`LruStore`], lazily allocated.
//!
//! Mirrors the Go original's `cache` type exactly: the underlying store
//! isn't allocated until the first `add`, so a `Group` that never takes a
//! miss never pays for an `LruStore` at all.

use parking_lot::Mutex;

use crate::byteview::ByteView;
use crate::lru::LruStore;

/// Lazily-initialized, mutex-guarded LRU store.
pub struct ConcurrentCache {
    max_bytes: usize,
    inner: Mutex<Option<LruStore>>,
}

impl ConcurrentCache {
    /// Creates a wrapper with the given byte budget. No storage is
    /// allocated yet.
    pub fn new(max_bytes: usize) -> Self {
        ConcurrentCache {
            max_bytes,
            inner: Mutex::new(None),
        }
    }

    /// Returns a cached value for `key`, or `None` if the store hasn't been
    /// allocated yet or the key isn't present.
    pub fn get(&self, key: &[u8]) -> Option<ByteView> {
        let mut guard = self.inner.lock();
        guard.as_mut()?.get(key)
    }

    /// Inserts `key`/`value`, allocating the underlying store on first use.
    pub fn add(&self, key: &[u8], value: ByteView) {
        let mut guard = self.inner.lock();
        guard
            .get_or_insert_with(|| LruStore::new(self.max_bytes))
            .add(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn miss_before_any_add() {
        let cache = ConcurrentCache::new(0);
        assert!(cache.get(b"absent").is_none());
    }

    #[test]
    fn allocates_lazily_and_round_trips() {
        let cache = ConcurrentCache::new(0);
        cache.add(b"k", ByteView::new(b"v"));
        assert_eq!(cache.get(b"k").map(|v| v.to_vec()), Some(b"v".to_vec()));
    }
}
