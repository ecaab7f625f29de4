//! Shared helpers for planner and pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::key::{NodeKey, SliceKey};
use crate::mesh::{TriangleMesh, Vertex};
use crate::observer::AssemblyObserver;
use crate::planner::MergePlanner;
use crate::tree::AssemblyTree;

/// One-triangle mesh at height `key`, tagged with its slice key.
pub fn slice_mesh(key: SliceKey) -> TriangleMesh {
  let z = key as f32;
  TriangleMesh::from_slice(
    key,
    vec![
      Vertex::new([0.0, 0.0, z], [0.0, 0.0, 1.0]),
      Vertex::new([1.0, 0.0, z], [0.0, 0.0, 1.0]),
      Vertex::new([0.0, 1.0, z], [0.0, 0.0, 1.0]),
    ],
    vec![0, 1, 2],
  )
}

/// Observer that counts every callback, keyed by node.
#[derive(Default)]
pub struct CountingObserver {
  pub merges: Mutex<HashMap<NodeKey, usize>>,
  pub leaves: AtomicUsize,
  pub failed_leaves: AtomicUsize,
  pub assembled: AtomicUsize,
}

impl CountingObserver {
  pub fn merge_count(&self, key: NodeKey) -> usize {
    self.merges.lock().unwrap().get(&key).copied().unwrap_or(0)
  }

  pub fn total_merges(&self) -> usize {
    self.merges.lock().unwrap().values().sum()
  }

  /// Panics if any branch merged more than once.
  pub fn assert_no_duplicate_merges(&self) {
    for (key, count) in self.merges.lock().unwrap().iter() {
      assert_eq!(*count, 1, "Branch {} merged {} times", key, count);
    }
  }
}

impl AssemblyObserver for CountingObserver {
  fn on_node_completed(&self, key: NodeKey, is_leaf: bool, success: bool) {
    if is_leaf {
      self.leaves.fetch_add(1, Ordering::SeqCst);
      if !success {
        self.failed_leaves.fetch_add(1, Ordering::SeqCst);
      }
    } else {
      *self.merges.lock().unwrap().entry(key).or_insert(0) += 1;
    }
  }

  fn on_assembly_completed(&self) {
    self.assembled.fetch_add(1, Ordering::SeqCst);
  }
}

/// Check that no frontier node is an ancestor of another and that the
/// frontier covers each leaf at most once.
pub fn assert_frontier_disjoint<M>(tree: &AssemblyTree<M>, frontier: &[NodeKey]) {
  let ids: Vec<_> = frontier
    .iter()
    .map(|key| tree.find(*key).expect("frontier key belongs to the tree"))
    .collect();

  for &a in &ids {
    for &b in &ids {
      assert!(
        !tree.is_ancestor(a, b),
        "Frontier holds {} together with its ancestor {}",
        tree.node(b).key(),
        tree.node(a).key()
      );
    }
  }

  let mut covered = HashSet::new();
  for &id in &ids {
    for leaf in tree.leaves_under(id) {
      assert!(covered.insert(leaf), "Leaf {} covered twice", leaf);
    }
  }
}

/// Frontier keys of a planner.
pub fn frontier_keys(planner: &MergePlanner<TriangleMesh>) -> Vec<NodeKey> {
  planner.current_frontier().into_iter().map(|(key, _)| key).collect()
}
