//! The cache `Group`: a named namespace over one loader, one local LRU
//! store, and (optionally) a ring of peers to consult before falling back
//! to the loader.
//!
//! The state machine in [`Group::get`] is straightforward: check the local cache,
//! then coalesce concurrent misses through a single-flight call that tries
//! a remote peer first (if one owns the key and peers are registered) and
//! falls back to the loader exactly once if the peer round trip fails.

use std::fmt;
use std::sync::{Arc, OnceLock};

use gocache_common::{GoCacheError, GoCacheResult};
use tracing::{debug, info, warn};

use crate::byteview::ByteView;
use crate::cache::ConcurrentCache;
use crate::peers::{Loader, PeerGetter, PeerPicker};
use crate::singleflight;

/// A named, independently-bounded cache namespace.
pub struct Group {
    name: String,
    loader: Box<dyn Loader>,
    main_cache: ConcurrentCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    coalescer: singleflight::Group<ByteView, GoCacheError>,
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("peers_registered", &self.peers.get().is_some())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Group({})", self.name)
    }
}

impl Group {
    /// Creates a group backed by `loader`, bounded to `cache_bytes` (`0` =
    /// unbounded). Passing `None` for `loader` is a `CONFIG_ERROR` and
    /// panics immediately, matching the original's `panic("nil Getter")` —
    /// a cache namespace with nothing to load on a miss is a programming
    /// mistake, not a runtime condition to recover from.
    pub fn new(name: impl Into<String>, cache_bytes: usize, loader: Option<Box<dyn Loader>>) -> Self {
        let loader = loader.expect("gocache: nil loader passed to Group::new");
        Group {
            name: name.into(),
            loader,
            main_cache: ConcurrentCache::new(cache_bytes),
            peers: OnceLock::new(),
            coalescer: singleflight::Group::new(),
        }
    }

    /// This group's name, used as the path segment peers address it by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers the peer ring this group consults before falling back to
    /// its own loader. May only be called once; a second call is a
    /// `CONFIG_ERROR` and panics, matching the original's
    /// `panic("RegisterPeerPicker called more than once")`.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("gocache: register_peers called more than once");
        }
    }

    /// Looks up `key`, consulting the local cache, then a peer (if one owns
    /// the key), then the loader.
    pub fn get(&self, key: &str) -> GoCacheResult<ByteView> {
        if key.is_empty() {
            return Err(GoCacheError::KeyRequired);
        }

        if let Some(value) = self.main_cache.get(key.as_bytes()) {
            debug!(group = %self.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key)
    }

    fn load(&self, key: &str) -> GoCacheResult<ByteView> {
        self.coalescer.do_call(key, || {
            if let Some(picker) = self.peers.get() {
                if let Some(peer) = picker.pick_peer(key) {
                    info!(group = %self.name, key, "routing to peer");
                    match self.get_from_peer(peer.as_ref(), key) {
                        Ok(value) => return Ok(value),
                        Err(err) => {
                            warn!(group = %self.name, key, %err, "peer fetch failed, falling back to loader");
                        }
                    }
                }
            }
            self.get_locally(key)
        })
    }

    fn get_locally(&self, key: &str) -> GoCacheResult<ByteView> {
        let bytes = self.loader.load(key)?;
        let value = ByteView::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key.as_bytes(), value);
    }

    /// Fetches `key` from `peer`. Deliberately does not call
    /// [`Group::populate_cache`] — a value owned by another peer does not
    /// belong in this node's local cache, or every node would end up
    /// holding a full copy of every key.
    fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> GoCacheResult<ByteView> {
        let bytes = peer
            .get(&self.name, key)
            .map_err(|err| GoCacheError::PeerUnavailable(err.to_string()))?;
        Ok(ByteView::from(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn scores_db() -> HashMap<&'static str, &'static str> {
        HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")])
    }

    #[test]
    fn misses_load_once_then_hit_from_cache() {
        let db = scores_db();
        let load_counts: Arc<Mutex<HashMap<String, usize>>> = Arc::new(Mutex::new(HashMap::new()));
        let counts = Arc::clone(&load_counts);

        let group = Group::new(
            "scores",
            2 << 10,
            Some(Box::new(move |key: &str| {
                if let Some(value) = db.get(key) {
                    *counts.lock().unwrap().entry(key.to_string()).or_insert(0) += 1;
                    Ok(value.as_bytes().to_vec())
                } else {
                    Err(GoCacheError::NotFound(key.to_string()))
                }
            })),
        );

        for (key, value) in scores_db() {
            let first = group.get(key).unwrap();
            assert_eq!(first.to_string_lossy(), value);

            let second = group.get(key).unwrap();
            assert_eq!(second.to_string_lossy(), value);
            assert_eq!(*load_counts.lock().unwrap().get(key).unwrap(), 1);
        }

        assert!(group.get("unknown").is_err());
    }

    #[test]
    fn empty_key_is_rejected_before_touching_the_loader() {
        let calls = AtomicUsize::new(0);
        let group = Group::new(
            "g",
            0,
            Some(Box::new(move |_key: &str| -> GoCacheResult<Vec<u8>> {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![])
            })),
        );

        assert_eq!(group.get(""), Err(GoCacheError::KeyRequired));
    }

    #[test]
    #[should_panic(expected = "nil loader")]
    fn nil_loader_panics_at_construction() {
        let _ = Group::new("g", 0, None);
    }
}
