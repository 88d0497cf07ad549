//! Maps keys to peers via a consistent-hash ring, skipping the round trip
//! when the ring picks this node itself.

use std::collections::HashMap;
use std::sync::Arc;

use gocache_core::{HashRing, PeerGetter, PeerPicker};

use crate::client::HttpPeerGetter;

/// Default virtual-node count per real peer, matching the original's
/// `defaultReplicas = 50`.
pub const DEFAULT_REPLICAS: usize = 50;

/// Consistent-hash peer picker over a fixed set of HTTP peers.
pub struct HttpPeerPicker {
    self_url: String,
    ring: HashRing,
    getters: HashMap<String, Arc<dyn PeerGetter>>,
}

impl HttpPeerPicker {
    /// `self_url` is this node's own base URL, used to recognize "the ring
    /// picked me" and skip the network round trip. `peer_urls` should
    /// include every peer in the cluster, including `self_url`.
    pub fn new(self_url: impl Into<String>, peer_urls: &[impl AsRef<str>]) -> Self {
        let self_url = self_url.into();
        let ring = HashRing::new(DEFAULT_REPLICAS, None);
        ring.add(peer_urls);

        let getters = peer_urls
            .iter()
            .map(|url| {
                let url = url.as_ref().to_string();
                let getter: Arc<dyn PeerGetter> = Arc::new(HttpPeerGetter::new(url.clone()));
                (url, getter)
            })
            .collect();

        HttpPeerPicker {
            self_url,
            ring,
            getters,
        }
    }
}

impl PeerPicker for HttpPeerPicker {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let owner = self.ring.get(key)?;
        if owner == self.self_url {
            return None;
        }
        self.getters.get(&owner).cloned()
    }
}
