//! MergePlanner - concurrent, incremental tree reduction of slice meshes.
//!
//! ```text
//!   worker threads                        MergePlanner
//!  ┌──────────────┐  on_mesh_completed  ┌──────────────────────────────┐
//!  │ slice 3 done ├────────────────────►│ leaf slot ← model            │
//!  └──────────────┘                     │ registry  ← leaf             │
//!  ┌──────────────┐                     │ walk to root:                │
//!  │ slice 1 done ├────────────────────►│   children ready? claim?     │
//!  └──────────────┘                     │   merge, registry swap       │
//!        ...                            │ root complete → signal       │
//!                                       └──────────────────────────────┘
//! ```
//!
//! Every completion walks from its leaf to the root. At each branch whose
//! children are both ready, the walker tries to claim the merge without
//! blocking. Losing the claim is routine: the winner is on the same walk and
//! carries it upward, so no branch is left behind and none merges twice.
//!
//! Lock order is always node slot, then registry. A node's slot is populated
//! and its registry entry published under the same slot lock, so a parent
//! merge can never remove an entry before it has been inserted.

mod registry;
mod signal;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use smallvec::SmallVec;
use web_time::Instant;

pub use registry::LiveRegistry;
pub use signal::CompletionSignal;

use crate::config::AssemblyConfig;
use crate::error::{AssemblyError, AssemblyResult};
use crate::key::{DescendingKeys, KeyAllocator, NodeKey, SliceKey};
use crate::metrics::AssemblyMetrics;
use crate::model::{merge_models, MeshModel};
use crate::observer::{AssemblyObserver, NullObserver};
use crate::order::{order_slices, SliceDescriptor};
use crate::tree::{AssemblyNode, AssemblyTree, NodeId, NodeKind};

/// Read-only view of one node's state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeInfo {
  pub key: NodeKey,
  pub depth: u32,
  pub is_leaf: bool,
  pub can_merge: bool,
  pub mesh_complete: bool,
  pub parent: Option<NodeKey>,
  pub children: SmallVec<[NodeKey; 2]>,
}

/// Overall assembly progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblyProgress {
  /// Slices in the plan.
  pub total: usize,
  /// Slices that have reported (successfully or not).
  pub completed: usize,
  /// Slices that reported a failure.
  pub failed: usize,
  /// Branch merges performed so far.
  pub merges: usize,
}

impl AssemblyProgress {
  /// Fraction of slices reported, in [0, 1].
  pub fn fraction(&self) -> f64 {
    if self.total == 0 {
      0.0
    } else {
      self.completed as f64 / self.total as f64
    }
  }
}

/// Merges slice meshes pairwise up a static tree as they complete.
///
/// Share it across worker threads behind an `Arc`; every method takes `&self`.
pub struct MergePlanner<M: MeshModel> {
  tree: AssemblyTree<M>,
  registry: LiveRegistry<M>,
  completion: CompletionSignal,
  observer: Arc<dyn AssemblyObserver>,
  metrics: AssemblyMetrics,
  failed: Mutex<BTreeSet<SliceKey>>,
  completed_leaves: AtomicUsize,
  merges: AtomicUsize,
}

impl<M: MeshModel> MergePlanner<M> {
  /// Plan over `keys` in the given leaf order.
  pub fn new(keys: &[SliceKey], config: &AssemblyConfig) -> AssemblyResult<Self> {
    Self::with_allocator(keys, &DescendingKeys::new(config.branch_key_base))
  }

  /// Plan over discovered slices, ordered by their sort keys.
  pub fn from_slices(slices: &[SliceDescriptor], config: &AssemblyConfig) -> AssemblyResult<Self> {
    let keys = order_slices(slices, config);
    Self::new(&keys, config)
  }

  /// Plan over `keys` with branch keys drawn from `allocator`.
  pub fn with_allocator(keys: &[SliceKey], allocator: &dyn KeyAllocator) -> AssemblyResult<Self> {
    Ok(Self::from_tree(AssemblyTree::build(keys, allocator)?))
  }

  /// Plan over a tree that has not received any models yet.
  pub fn from_tree(tree: AssemblyTree<M>) -> Self {
    Self {
      tree,
      registry: LiveRegistry::new(),
      completion: CompletionSignal::new(),
      observer: Arc::new(NullObserver),
      metrics: AssemblyMetrics::new(),
      failed: Mutex::new(BTreeSet::new()),
      completed_leaves: AtomicUsize::new(0),
      merges: AtomicUsize::new(0),
    }
  }

  /// Attach an observer for node and assembly completion callbacks.
  pub fn with_observer(mut self, observer: Arc<dyn AssemblyObserver>) -> Self {
    self.observer = observer;
    self
  }

  // ===========================================================================
  // Inbound
  // ===========================================================================

  /// Report that a slice finished generating.
  ///
  /// `mesh == None` or `success == false` marks the slice as failed; its leaf
  /// still completes with an empty model so the tree can finish. Must be
  /// called exactly once per slice, from any thread, in any order.
  #[tracing::instrument(level = "debug", skip(self, mesh), name = "planner::on_mesh_completed")]
  pub fn on_mesh_completed(&self, slice_key: SliceKey, mesh: Option<M>, success: bool) -> AssemblyResult<()> {
    let leaf_id = self
      .tree
      .leaf(slice_key)
      .ok_or(AssemblyError::UnknownSliceKey(slice_key))?;
    let leaf = self.tree.node(leaf_id);

    let (model, success) = match mesh {
      Some(mesh) if success => (mesh, true),
      _ => (M::empty(), false),
    };
    let model = Arc::new(model);

    {
      let mut slot = leaf.write_slot();
      if !slot.populate(Arc::clone(&model)) {
        return Err(AssemblyError::SliceAlreadyCompleted(slice_key));
      }
      self.registry.insert(leaf.key(), model);
    }

    self.completed_leaves.fetch_add(1, Ordering::AcqRel);
    self.metrics.record_leaf(success);
    if !success {
      tracing::warn!(slice = slice_key, "slice failed to generate, merging empty model");
      self
        .failed
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(slice_key);
    }
    self.observer.on_node_completed(leaf.key(), true, success);

    self.check_for_merge(leaf.parent())
  }

  // ===========================================================================
  // Merge propagation
  // ===========================================================================

  /// Walk from `start` to the root, merging every branch that is ready.
  fn check_for_merge(&self, start: Option<NodeId>) -> AssemblyResult<()> {
    let mut cursor = start;
    while let Some(id) = cursor {
      let node = self.tree.node(id);
      if self.can_merge_children(node)? {
        if node.claim.try_claim() {
          self.merge_children(node)?;
        } else {
          tracing::trace!(branch = %node.key(), "merge claimed by another thread");
          self.metrics.record_deferred_claim();
        }
      }
      cursor = node.parent();
    }

    self.check_root_complete();
    Ok(())
  }

  /// True when every present child holds a model ready to merge.
  fn can_merge_children(&self, node: &AssemblyNode<M>) -> AssemblyResult<bool> {
    match node.kind() {
      NodeKind::Leaf => Ok(false),
      NodeKind::Branch {
        left: None,
        right: None,
      } => Err(AssemblyError::InvalidTreeShape(node.key())),
      NodeKind::Branch { left, right } => Ok(
        left
          .into_iter()
          .chain(right)
          .all(|child| self.tree.node(child).can_merge()),
      ),
    }
  }

  /// Fold the children's models into `node`. Caller holds the merge claim.
  fn merge_children(&self, node: &AssemblyNode<M>) -> AssemblyResult<()> {
    let start = Instant::now();
    let children = node.children();

    let mut taken = children
      .iter()
      .filter_map(|&child| self.tree.node(child).write_slot().reclaim());
    let combined = match (taken.next(), taken.next()) {
      (Some(left), Some(right)) => merge_models(left, &right),
      (Some(only), None) => only,
      _ => {
        node.claim.release();
        return Err(AssemblyError::InvalidTreeShape(node.key()));
      }
    };
    drop(taken);

    let child_keys: SmallVec<[NodeKey; 2]> = children
      .iter()
      .map(|&child| self.tree.node(child).key())
      .collect();
    {
      let mut slot = node.write_slot();
      slot.populate(Arc::clone(&combined));
      self.registry.replace(&child_keys, node.key(), combined);
    }
    node.claim.finish();

    let merge_us = start.elapsed().as_micros() as u64;
    self.merges.fetch_add(1, Ordering::AcqRel);
    self.metrics.record_merge(merge_us);
    tracing::debug!(branch = %node.key(), depth = node.depth(), merge_us, "merged children");
    self.observer.on_node_completed(node.key(), false, true);
    Ok(())
  }

  fn check_root_complete(&self) {
    if self.tree.root().mesh_complete() && self.completion.set() {
      tracing::info!(
        slices = self.tree.leaf_count(),
        merges = self.merges.load(Ordering::Acquire),
        "mesh assembly complete"
      );
      self.observer.on_assembly_completed();
    }
  }

  // ===========================================================================
  // Outbound
  // ===========================================================================

  /// Models on the current merge frontier, ordered by node key.
  pub fn current_models(&self) -> Arc<[Arc<M>]> {
    self.registry.snapshot()
  }

  /// Frontier models with the keys of the nodes that hold them.
  pub fn current_frontier(&self) -> Vec<(NodeKey, Arc<M>)> {
    self.registry.entries()
  }

  /// Gate set once the root has its model.
  pub fn completion(&self) -> &CompletionSignal {
    &self.completion
  }

  pub fn is_complete(&self) -> bool {
    self.completion.is_set()
  }

  /// The final composite, once assembly is complete.
  pub fn root_model(&self) -> Option<Arc<M>> {
    self.tree.root().model()
  }

  // ===========================================================================
  // Introspection
  // ===========================================================================

  pub fn tree(&self) -> &AssemblyTree<M> {
    &self.tree
  }

  pub fn root_key(&self) -> NodeKey {
    self.tree.root().key()
  }

  pub fn depth(&self) -> u32 {
    self.tree.depth()
  }

  /// State of any node, leaf or branch.
  pub fn node(&self, key: NodeKey) -> Option<NodeInfo> {
    let id = self.tree.find(key)?;
    let node = self.tree.node(id);
    Some(NodeInfo {
      key: node.key(),
      depth: node.depth(),
      is_leaf: node.is_leaf(),
      can_merge: node.can_merge(),
      mesh_complete: node.mesh_complete(),
      parent: node.parent().map(|p| self.tree.node(p).key()),
      children: node
        .children()
        .iter()
        .map(|&c| self.tree.node(c).key())
        .collect(),
    })
  }

  /// Slice keys in leaf order.
  pub fn slice_keys(&self) -> &[SliceKey] {
    self.tree.leaf_order()
  }

  /// Slices that reported a failure, ascending.
  pub fn failed_slices(&self) -> Vec<SliceKey> {
    let failed = self.failed.lock().unwrap_or_else(PoisonError::into_inner);
    failed.iter().copied().collect()
  }

  /// Slices that have not reported yet, in leaf order.
  pub fn pending_slices(&self) -> Vec<SliceKey> {
    self
      .tree
      .leaf_order()
      .iter()
      .copied()
      .filter(|&key| {
        self
          .tree
          .leaf(key)
          .is_some_and(|id| !self.tree.node(id).mesh_complete())
      })
      .collect()
  }

  pub fn progress(&self) -> AssemblyProgress {
    AssemblyProgress {
      total: self.tree.leaf_count(),
      completed: self.completed_leaves.load(Ordering::Acquire),
      failed: self.failed.lock().unwrap_or_else(PoisonError::into_inner).len(),
      merges: self.merges.load(Ordering::Acquire),
    }
  }

  pub fn metrics(&self) -> &AssemblyMetrics {
    &self.metrics
  }
}
