//! AssemblyNode - one node of the static assembly tree.
//!
//! Nodes live in the tree's arena and refer to each other by [`NodeId`].
//! Parent links are plain indices used for the upward merge walk; the arena
//! owns every node.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use smallvec::SmallVec;

use crate::key::NodeKey;
use crate::model::ModelSlot;

/// Index of a node in the tree arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
  #[inline]
  pub fn index(&self) -> usize {
    self.0
  }
}

/// Leaf or branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
  /// One input slice.
  Leaf,
  /// Merge point for one or two children.
  Branch {
    left: Option<NodeId>,
    right: Option<NodeId>,
  },
}

const CLAIM_IDLE: u8 = 0;
const CLAIM_MERGING: u8 = 1;
const CLAIM_MERGED: u8 = 2;

/// Non-blocking, at-most-once merge claim for a branch.
///
/// `Idle -> Merging -> Merged`. A thread that loses the race to move out of
/// `Idle` never waits; the winner carries the merge walk upward.
#[derive(Debug, Default)]
pub(crate) struct MergeClaim(AtomicU8);

impl MergeClaim {
  /// Try to claim the merge. Never blocks.
  #[inline]
  pub(crate) fn try_claim(&self) -> bool {
    self
      .0
      .compare_exchange(CLAIM_IDLE, CLAIM_MERGING, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }

  /// Mark a claimed merge as done.
  #[inline]
  pub(crate) fn finish(&self) {
    self.0.store(CLAIM_MERGED, Ordering::Release);
  }

  /// Give a claim back without merging.
  #[inline]
  pub(crate) fn release(&self) {
    self.0.store(CLAIM_IDLE, Ordering::Release);
  }

  #[inline]
  pub(crate) fn is_merged(&self) -> bool {
    self.0.load(Ordering::Acquire) == CLAIM_MERGED
  }
}

/// A node of the assembly tree.
///
/// Shape fields (`key`, `depth`, `parent`, `kind`) are fixed once the tree is
/// built. Only the model slot and the merge claim change afterwards.
#[derive(Debug)]
pub struct AssemblyNode<M> {
  key: NodeKey,
  depth: u32,
  parent: Option<NodeId>,
  kind: NodeKind,
  slot: RwLock<ModelSlot<M>>,
  pub(crate) claim: MergeClaim,
}

impl<M> AssemblyNode<M> {
  pub(crate) fn leaf(key: NodeKey) -> Self {
    Self {
      key,
      depth: 0,
      parent: None,
      kind: NodeKind::Leaf,
      slot: RwLock::new(ModelSlot::Empty),
      claim: MergeClaim::default(),
    }
  }

  pub(crate) fn branch(key: NodeKey, left: Option<NodeId>, right: Option<NodeId>, depth: u32) -> Self {
    Self {
      key,
      depth,
      parent: None,
      kind: NodeKind::Branch { left, right },
      slot: RwLock::new(ModelSlot::Empty),
      claim: MergeClaim::default(),
    }
  }

  pub(crate) fn set_parent(&mut self, parent: NodeId) {
    self.parent = Some(parent);
  }

  #[inline]
  pub fn key(&self) -> NodeKey {
    self.key
  }

  /// 0 for leaves, `1 + max(child depth)` for branches.
  #[inline]
  pub fn depth(&self) -> u32 {
    self.depth
  }

  #[inline]
  pub fn is_leaf(&self) -> bool {
    matches!(self.kind, NodeKind::Leaf)
  }

  #[inline]
  pub fn kind(&self) -> NodeKind {
    self.kind
  }

  /// Owning branch, `None` for the root.
  #[inline]
  pub fn parent(&self) -> Option<NodeId> {
    self.parent
  }

  /// Present children, left first. Empty for leaves.
  pub fn children(&self) -> SmallVec<[NodeId; 2]> {
    match self.kind {
      NodeKind::Leaf => SmallVec::new(),
      NodeKind::Branch { left, right } => left.into_iter().chain(right).collect(),
    }
  }

  /// True while this node holds a model its parent can merge.
  pub fn can_merge(&self) -> bool {
    self.read_slot().can_merge()
  }

  /// True once this node has (or had) its model.
  pub fn mesh_complete(&self) -> bool {
    self.read_slot().is_complete()
  }

  /// Current model, if not yet merged away.
  pub fn model(&self) -> Option<Arc<M>> {
    self.read_slot().model().cloned()
  }

  pub(crate) fn read_slot(&self) -> RwLockReadGuard<'_, ModelSlot<M>> {
    self.slot.read().unwrap_or_else(PoisonError::into_inner)
  }

  pub(crate) fn write_slot(&self) -> RwLockWriteGuard<'_, ModelSlot<M>> {
    self.slot.write().unwrap_or_else(PoisonError::into_inner)
  }
}

#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
