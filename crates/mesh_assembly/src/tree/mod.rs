//! Static balanced binary tree that plans the merge order.
//!
//! Leaves are slices; branches are merge points. The tree is built once,
//! bottom-up, and its shape never changes. Only node model slots mutate as
//! slices complete and merges happen.
//!
//! # Module Structure
//!
//! - [`node`]: `AssemblyNode` - leaf/branch node with its model slot
//! - [`builder`]: layer-by-layer construction

mod builder;
pub mod node;

use std::collections::HashMap;

pub use node::{AssemblyNode, NodeId, NodeKind};

use crate::error::AssemblyResult;
use crate::key::{KeyAllocator, NodeKey, SliceKey};

/// Arena-backed assembly tree.
#[derive(Debug)]
pub struct AssemblyTree<M> {
  nodes: Vec<AssemblyNode<M>>,
  root: NodeId,
  leaves: HashMap<SliceKey, NodeId>,
  by_key: HashMap<NodeKey, NodeId>,
  leaf_order: Vec<SliceKey>,
  layer_count: usize,
}

impl<M> AssemblyTree<M> {
  /// Build a tree over `keys`. Adjacent keys become leaf siblings.
  ///
  /// Fails on an empty key set, duplicate keys, or a branch key from
  /// `allocator` that collides with a slice key.
  pub fn build(keys: &[SliceKey], allocator: &dyn KeyAllocator) -> AssemblyResult<Self> {
    builder::build_tree(keys, allocator)
  }

  #[inline]
  pub fn root_id(&self) -> NodeId {
    self.root
  }

  #[inline]
  pub fn root(&self) -> &AssemblyNode<M> {
    &self.nodes[self.root.0]
  }

  /// Node by arena id.
  ///
  /// Ids handed out by this tree are always valid.
  #[inline]
  pub fn node(&self, id: NodeId) -> &AssemblyNode<M> {
    &self.nodes[id.0]
  }

  /// Leaf for a slice key.
  #[inline]
  pub fn leaf(&self, key: SliceKey) -> Option<NodeId> {
    self.leaves.get(&key).copied()
  }

  /// Any node (leaf or branch) by key.
  #[inline]
  pub fn find(&self, key: NodeKey) -> Option<NodeId> {
    self.by_key.get(&key).copied()
  }

  /// Total node count.
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  /// Always false: empty trees cannot be built.
  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  pub fn leaf_count(&self) -> usize {
    self.leaves.len()
  }

  pub fn branch_count(&self) -> usize {
    self.nodes.len() - self.leaves.len()
  }

  /// Depth of the root.
  pub fn depth(&self) -> u32 {
    self.root().depth()
  }

  /// Number of layers built above the leaves.
  pub fn layer_count(&self) -> usize {
    self.layer_count
  }

  /// Slice keys in leaf order.
  pub fn leaf_order(&self) -> &[SliceKey] {
    &self.leaf_order
  }

  /// Iterate over all nodes with their ids.
  pub fn iter(&self) -> impl Iterator<Item = (NodeId, &AssemblyNode<M>)> {
    self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
  }

  /// True if `ancestor` lies on the path from `node` to the root (exclusive of `node`).
  pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
    let mut cursor = self.node(node).parent();
    while let Some(id) = cursor {
      if id == ancestor {
        return true;
      }
      cursor = self.node(id).parent();
    }
    false
  }

  /// Slice keys of all leaves below (or at) `id`, in leaf order.
  pub fn leaves_under(&self, id: NodeId) -> Vec<SliceKey> {
    let mut out = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
      let node = self.node(current);
      if node.is_leaf() {
        out.push(node.key().raw());
      } else {
        let children = node.children();
        stack.extend(children.iter().rev());
      }
    }
    out
  }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
