//! AssemblyObserver - callback interface for consumers of the planner.
//!
//! Lets display or export code react to assembly progress without polling.
//! Callbacks run on whichever worker thread reported the slice or performed
//! the merge, after all planner locks are released.

use crate::key::NodeKey;

/// Callback interface for assembly progress.
///
/// Must be thread-safe as callbacks are invoked from worker threads.
///
/// # Example
///
/// ```ignore
/// struct ProgressBar {
///     done: AtomicUsize,
/// }
///
/// impl AssemblyObserver for ProgressBar {
///     fn on_node_completed(&self, key: NodeKey, is_leaf: bool, success: bool) {
///         if is_leaf {
///             self.done.fetch_add(1, Ordering::Relaxed);
///         }
///     }
///
///     fn on_assembly_completed(&self) {
///         println!("assembly done");
///     }
/// }
/// ```
pub trait AssemblyObserver: Send + Sync {
  /// Called when a node receives its model.
  ///
  /// # Arguments
  /// - `key`: The node that completed
  /// - `is_leaf`: True for slice completions, false for branch merges
  /// - `success`: False when a slice failed to generate and was filled with
  ///   an empty model. Always true for merges.
  fn on_node_completed(&self, key: NodeKey, is_leaf: bool, success: bool);

  /// Called exactly once, when the root receives its model.
  fn on_assembly_completed(&self);
}

/// No-op implementation for headless operation.
pub struct NullObserver;

impl AssemblyObserver for NullObserver {
  fn on_node_completed(&self, _key: NodeKey, _is_leaf: bool, _success: bool) {
    // No-op
  }

  fn on_assembly_completed(&self) {
    // No-op
  }
}
