//! Error types for assembly planning.

use thiserror::Error;

use crate::key::{NodeKey, SliceKey};

/// Errors raised by tree construction and by the merge planner.
///
/// Every variant indicates a caller or construction mistake. Failed slice
/// generation and contended merge claims are routine and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
  /// Tried to build a tree with no slices.
  #[error("Cannot build an assembly tree from zero slices")]
  EmptySliceSet,

  /// The same slice key was supplied twice at construction.
  #[error("Slice key {0} appears more than once")]
  DuplicateSliceKey(SliceKey),

  /// The key allocator handed out a branch key already used by a slice.
  #[error("Branch key {0} collides with an existing slice key")]
  KeyCollision(NodeKey),

  /// A completion was reported for a slice that is not in the tree.
  #[error("Slice key {0} not found in assembly tree")]
  UnknownSliceKey(SliceKey),

  /// A completion was reported twice for the same slice.
  #[error("Slice {0} has already reported completion")]
  SliceAlreadyCompleted(SliceKey),

  /// A branch was found with neither child present.
  #[error("Branch {0} has no children")]
  InvalidTreeShape(NodeKey),

  /// A dedicated worker pool could not be started.
  #[error("Failed to build worker pool: {0}")]
  ThreadPool(String),
}

/// Result type for assembly operations.
pub type AssemblyResult<T> = std::result::Result<T, AssemblyError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_display() {
    let err = AssemblyError::UnknownSliceKey(42);
    assert_eq!(format!("{err}"), "Slice key 42 not found in assembly tree");

    let err = AssemblyError::InvalidTreeShape(NodeKey(u64::MAX));
    assert!(format!("{err}").contains(&u64::MAX.to_string()));

    let err = AssemblyError::KeyCollision(NodeKey(7));
    assert_eq!(format!("{err}"), "Branch key 7 collides with an existing slice key");
  }
}
