//! Capability traits a [`Group`](crate::group::Group) depends on, without
//! depending on any concrete transport or backing store.
//!
//! `Loader` is the Rust rendition of the Go original's "function satisfies a
//! one-method interface" trick (`GetterFunc`): a blanket impl lets a plain
//! closure be passed anywhere a `Loader` is expected, while a hand-written
//! struct can still implement the trait directly for cases that need state.

use std::sync::Arc;

use gocache_common::GoCacheResult;

/// Loads the value for a key from whatever backs this cache group — a
/// database, another service, a file, anything outside the cache itself.
pub trait Loader: Send + Sync {
    fn load(&self, key: &str) -> GoCacheResult<Vec<u8>>;
}

impl<F> Loader for F
where
    F: Fn(&str) -> GoCacheResult<Vec<u8>> + Send + Sync,
{
    fn load(&self, key: &str) -> GoCacheResult<Vec<u8>> {
        self(key)
    }
}

/// Fetches a key's value for a given group from a specific remote peer.
pub trait PeerGetter: Send + Sync {
    fn get(&self, group: &str, key: &str) -> GoCacheResult<Vec<u8>>;
}

/// Chooses which peer, if any, owns a key.
///
/// Returning `None` means the local node owns the key and should load it
/// itself rather than make a network round trip.
pub trait PeerPicker: Send + Sync {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}
