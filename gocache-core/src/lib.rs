//! Core subsystems of the distributed cache: the byte-budgeted LRU store,
//! the consistent-hash ring, the single-flight coalescer, and the `Group`
//! orchestrator that ties them together. Nothing in this crate knows how to
//! talk to the network — that lives in `gocache-peer`.

pub mod byteview;
pub mod cache;
pub mod group;
pub mod lru;
pub mod peers;
pub mod registry;
pub mod ring;
pub mod singleflight;

pub use byteview::ByteView;
pub use group::Group;
pub use peers::{Loader, PeerGetter, PeerPicker};
pub use ring::HashRing;
