//! Cache Entry Module
//!
//! Defines the byte-size capability required of cached values and the
//! structure stored for each key.

use std::rc::Rc;
use std::sync::Arc;

// == Byte Size ==
/// Capability required of every value stored in the cache.
///
/// Implementors report the number of bytes the value should be charged
/// against the cache's byte budget. The reported size must stay constant
/// while the value lives in the cache.
pub trait ByteSize {
    /// Returns the value's memory footprint in bytes.
    fn byte_size(&self) -> usize;
}

impl ByteSize for String {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

impl ByteSize for str {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

impl ByteSize for [u8] {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

impl ByteSize for Vec<u8> {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

impl<const N: usize> ByteSize for [u8; N] {
    fn byte_size(&self) -> usize {
        N
    }
}

impl<T: ByteSize + ?Sized> ByteSize for &T {
    fn byte_size(&self) -> usize {
        (**self).byte_size()
    }
}

impl<T: ByteSize + ?Sized> ByteSize for Box<T> {
    fn byte_size(&self) -> usize {
        (**self).byte_size()
    }
}

impl<T: ByteSize + ?Sized> ByteSize for Rc<T> {
    fn byte_size(&self) -> usize {
        (**self).byte_size()
    }
}

impl<T: ByteSize + ?Sized> ByteSize for Arc<T> {
    fn byte_size(&self) -> usize {
        (**self).byte_size()
    }
}

// == Cache Entry ==
/// A single key/value pair held in the recency list.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The key this entry is indexed under
    pub key: String,
    /// The stored value
    pub value: V,
}

impl<V: ByteSize> CacheEntry<V> {
    // == Constructor ==
    pub fn new(key: String, value: V) -> Self {
        Self { key, value }
    }

    // == Charge ==
    /// Bytes this entry contributes to the cache's usage: key length plus
    /// value size.
    pub fn charge(&self) -> usize {
        self.key.len() + self.value.byte_size()
    }
}
