//! Consistent-hash ring mapping keys to owning peer names.
//!
//! Each real node gets `replicas` virtual points on the ring so that load
//! redistributes evenly when a node joins or leaves. The hash input order
//! for a virtual point is `{replica_index}{node_name}` — index first — which
//! must match exactly or every key maps to a different owner than the Go
//! original it's ported from.

use parking_lot::RwLock;

/// A hash function from arbitrary bytes to a 32-bit ring position.
pub type HashFn = Box<dyn Fn(&[u8]) -> u32 + Send + Sync>;

struct RingState {
    points: Vec<u32>,
    owners: std::collections::HashMap<u32, String>,
}

/// Consistent-hash ring. `get` is read-locked, `add` is write-locked, so
/// lookups never block on each other even while the ring is read-heavy.
pub struct HashRing {
    replicas: usize,
    hash: HashFn,
    state: RwLock<RingState>,
}

impl HashRing {
    /// Creates a ring with `replicas` virtual nodes per real node. `hash`
    /// defaults to CRC32/IEEE, matching Go's `crc32.ChecksumIEEE`, when
    /// `None` is passed.
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        HashRing {
            replicas,
            hash: hash.unwrap_or_else(|| Box::new(|data: &[u8]| crc32fast::hash(data))),
            state: RwLock::new(RingState {
                points: Vec::new(),
                owners: std::collections::HashMap::new(),
            }),
        }
    }

    /// Adds real nodes to the ring, each contributing `replicas` virtual
    /// points. Safe to call repeatedly; existing points are kept and new
    /// ones are merged in sorted order.
    pub fn add(&self, nodes: &[impl AsRef<str>]) {
        let mut state = self.state.write();
        for node in nodes {
            let node = node.as_ref();
            for i in 0..self.replicas {
                let virtual_key = format!("{i}{node}");
                let point = (self.hash)(virtual_key.as_bytes());
                state.points.push(point);
                state.owners.insert(point, node.to_string());
            }
        }
        state.points.sort_unstable();
    }

    /// Returns the node owning `key`, or `None` if the ring has no nodes.
    pub fn get(&self, key: &str) -> Option<String> {
        let state = self.state.read();
        if state.points.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = state.points.partition_point(|&point| point < hash);
        let idx = if idx == state.points.len() { 0 } else { idx };
        state.owners.get(&state.points[idx]).cloned()
    }
}
