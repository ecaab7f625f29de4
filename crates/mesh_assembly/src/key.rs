//! Node identity for the assembly tree.
//!
//! Leaves are keyed by the externally assigned slice key. Branches receive
//! synthetic keys from a [`KeyAllocator`]; the default allocator counts down
//! from `u64::MAX` so branch keys stay clear of the small slice keys handed
//! out by slice discovery.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of one input slice mesh.
pub type SliceKey = u64;

/// Identity of a node in the assembly tree, unique across leaves and branches.
///
/// A leaf's node key equals its slice key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeKey(pub u64);

impl NodeKey {
  /// Get the raw key value.
  #[inline]
  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl From<SliceKey> for NodeKey {
  fn from(key: SliceKey) -> Self {
    Self(key)
  }
}

impl fmt::Display for NodeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Source of synthetic branch keys.
///
/// Implementations must never return the same key twice.
pub trait KeyAllocator: Send + Sync {
  /// Allocate the next branch key.
  fn next_key(&self) -> NodeKey;
}

/// Allocator that counts down from a base value.
///
/// Atomic so one allocator can be shared by trees built on different threads.
#[derive(Debug)]
pub struct DescendingKeys {
  next: AtomicU64,
}

impl DescendingKeys {
  /// Start counting down at `base` (the first key returned is `base`).
  pub fn new(base: u64) -> Self {
    Self {
      next: AtomicU64::new(base),
    }
  }
}

impl Default for DescendingKeys {
  fn default() -> Self {
    Self::new(u64::MAX)
  }
}

impl KeyAllocator for DescendingKeys {
  fn next_key(&self) -> NodeKey {
    NodeKey(self.next.fetch_sub(1, Ordering::Relaxed))
  }
}

#[cfg(test)]
#[path = "key_test.rs"]
mod key_test;
