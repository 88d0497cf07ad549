//! Shared error type and result alias used across every `gocache-*` crate.
//!
//! Mirrors the distributed cache's error taxonomy: a missing key, a loader
//! reporting nothing found, a peer round trip that failed, and any other
//! loader failure. Construction-time misuse (a nil loader, a double peer
//! registration) is intentionally not represented here — those are
//! programming errors and panic at the call site instead.

use thiserror::Error;

/// Errors a [`Group`](https://docs.rs/gocache-core) lookup can return to a caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GoCacheError {
    /// The caller passed an empty key.
    #[error("key is required")]
    KeyRequired,

    /// The loader ran but reported that the key does not exist.
    #[error("{0} not exist")]
    NotFound(String),

    /// A peer round trip failed. The caller already fell back to the local
    /// loader once; this variant is only returned if that fallback also
    /// failed.
    #[error("peer unavailable: {0}")]
    PeerUnavailable(String),

    /// The loader ran and failed for a reason other than "not found".
    #[error("loader failed: {0}")]
    LoaderFailed(String),
}

/// Result alias used throughout the cache subsystems.
pub type GoCacheResult<T> = Result<T, GoCacheError>;
