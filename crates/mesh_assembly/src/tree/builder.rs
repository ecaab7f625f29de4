//! Bottom-up construction of the assembly tree.
//!
//! ```text
//! layer 0:   L0   L1   L2   L3   L4
//!             \   /     \   /    |
//! layer 1:     B0        B1      L4   (odd node carried forward)
//!                \      /        |
//! layer 2:          B2           L4
//!                     \         /
//! layer 3:                B3            (root)
//! ```

use std::collections::HashMap;

use crate::error::{AssemblyError, AssemblyResult};
use crate::key::{KeyAllocator, NodeKey, SliceKey};

use super::node::{AssemblyNode, NodeId};
use super::AssemblyTree;

/// Build a tree from slice keys in leaf order.
pub(crate) fn build_tree<M>(
  keys: &[SliceKey],
  allocator: &dyn KeyAllocator,
) -> AssemblyResult<AssemblyTree<M>> {
  if keys.is_empty() {
    return Err(AssemblyError::EmptySliceSet);
  }

  let mut nodes: Vec<AssemblyNode<M>> = Vec::with_capacity(keys.len() * 2);
  let mut by_key: HashMap<NodeKey, NodeId> = HashMap::with_capacity(keys.len() * 2);
  let mut leaves: HashMap<SliceKey, NodeId> = HashMap::with_capacity(keys.len());

  for &key in keys {
    let id = NodeId(nodes.len());
    if by_key.insert(NodeKey(key), id).is_some() {
      return Err(AssemblyError::DuplicateSliceKey(key));
    }
    leaves.insert(key, id);
    nodes.push(AssemblyNode::leaf(NodeKey(key)));
  }

  let mut layer: Vec<NodeId> = (0..nodes.len()).map(NodeId).collect();
  let mut layer_count = 0;
  while layer.len() > 1 {
    layer = build_layer(&mut nodes, &mut by_key, &layer, allocator)?;
    layer_count += 1;
  }

  let root = layer[0];
  tracing::debug!(
    leaves = leaves.len(),
    branches = nodes.len() - leaves.len(),
    layers = layer_count,
    depth = nodes[root.0].depth(),
    "built assembly tree"
  );

  Ok(AssemblyTree {
    nodes,
    root,
    leaves,
    by_key,
    leaf_order: keys.to_vec(),
    layer_count,
  })
}

/// Pair up adjacent nodes under new branches. An odd trailing node is carried
/// into the next layer as-is.
fn build_layer<M>(
  nodes: &mut Vec<AssemblyNode<M>>,
  by_key: &mut HashMap<NodeKey, NodeId>,
  current: &[NodeId],
  allocator: &dyn KeyAllocator,
) -> AssemblyResult<Vec<NodeId>> {
  let mut next = Vec::with_capacity(current.len().div_ceil(2));

  for pair in current.chunks(2) {
    let &[left, right] = pair else {
      next.push(pair[0]);
      continue;
    };

    let key = allocator.next_key();
    let id = NodeId(nodes.len());
    if by_key.insert(key, id).is_some() {
      return Err(AssemblyError::KeyCollision(key));
    }

    let depth = 1 + nodes[left.0].depth().max(nodes[right.0].depth());
    nodes.push(AssemblyNode::branch(key, Some(left), Some(right), depth));
    nodes[left.0].set_parent(id);
    nodes[right.0].set_parent(id);
    next.push(id);
  }

  Ok(next)
}
