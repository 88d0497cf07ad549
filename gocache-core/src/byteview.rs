//! Immutable view over a cached value.
//!
//! `ByteView` wraps an `Arc<[u8]>` rather than a `Vec<u8>` so clones — which
//! happen on every cache hit — never copy the underlying bytes. The only
//! copies that occur are the defensive ones at construction and at
//! [`ByteView::to_vec`], matching the ingress/egress boundary the store's
//! callers sit behind.

use std::fmt;
use std::sync::Arc;

/// An opaque, immutable byte sequence returned from and stored in the cache.
#[derive(Clone, PartialEq, Eq)]
pub struct ByteView(Arc<[u8]>);

impl ByteView {
    /// Builds a view by copying `bytes` into owned storage.
    ///
    /// The copy happens once, here, so neither the loader's buffer nor the
    /// caller's buffer can alias what the store holds.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        ByteView(Arc::from(bytes.as_ref()))
    }

    /// Number of bytes in the view.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the view holds zero bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the underlying bytes without copying.
    ///
    /// Safe to expose by reference because `ByteView` itself is immutable:
    /// callers can never observe a mutation through this borrow.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Copies the view into a fresh, independently-owned buffer.
    ///
    /// Use this when a caller needs to mutate the bytes, or needs a type
    /// that outlives the `ByteView` without holding a reference to it.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Interprets the view as UTF-8, lossily replacing invalid sequences.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ByteView").field(&self.len()).finish()
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        ByteView(Arc::from(bytes.into_boxed_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_does_not_duplicate_storage() {
        let a = ByteView::new(b"hello world");
        let b = a.clone();
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(a.len(), 11);
    }

    #[test]
    fn to_vec_is_independent_of_the_view() {
        let view = ByteView::new(b"abc");
        let mut owned = view.to_vec();
        owned.push(b'd');
        assert_eq!(view.as_bytes(), b"abc");
        assert_eq!(owned, b"abcd");
    }
}
